//! Core library for rental invoice processing.
//!
//! This crate provides:
//! - Text extraction from invoice PDFs (and pre-extracted text dumps)
//! - Rule-based field extraction for the Swedish rental invoice template
//!   (payment reference, due date, total amount, VAT, rent/utility breakdown)
//! - Invoice records and a local store for idempotent reprocessing

pub mod error;
pub mod invoice;
pub mod models;
pub mod pdf;
pub mod store;

pub use error::{ExtractionError, HyresaviError, PdfError, Result, StoreError};
pub use invoice::{build_record, parse_invoice_file, InvoiceParser, RentalInvoiceParser};
pub use models::config::HyresaviConfig;
pub use models::fields::{keys, DuePeriod, FieldValue, ParsedInvoiceFields};
pub use models::record::{invoice_id_for, InvoiceRecord};
pub use pdf::{extractor_for, PdfExtractor, PdfType, PlainTextExtractor, TextExtractor};
pub use store::{InvoiceStore, JsonFileStore, PutOutcome};
