//! Invoice field extraction module.

mod parser;
pub mod pipeline;
pub mod rules;

pub use parser::{InvoiceParser, RentalInvoiceParser};
pub use pipeline::{build_record, parse_invoice_file};

use crate::error::ExtractionError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
