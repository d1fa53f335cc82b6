//! File-level parsing: extract text, parse it, tag it with its source.

use std::path::Path;

use tracing::{error, info};

use crate::error::ExtractionError;
use crate::models::config::HyresaviConfig;
use crate::models::fields::{keys, ParsedInvoiceFields};
use crate::models::record::{file_stem, invoice_id_for, InvoiceRecord};
use crate::pdf::{extractor_for, TextExtractor};

use super::parser::{InvoiceParser, RentalInvoiceParser};
use super::Result;

/// Extract the text of `path`, parse it, and add the `Filename` field.
///
/// Text extraction failures are reported as [`ExtractionError::Parse`]
/// wrapping the original error.
pub fn parse_invoice_file<E, P>(extractor: &E, parser: &P, path: &Path) -> Result<ParsedInvoiceFields>
where
    E: TextExtractor + ?Sized,
    P: InvoiceParser + ?Sized,
{
    let text = extractor.extract_text(path).map_err(|e| {
        error!("Text extraction failed for {}: {}", path.display(), e);
        ExtractionError::parse(e)
    })?;

    let mut fields = parser.parse(&text).inspect_err(|e| {
        error!("Error parsing {}: {}", path.display(), e);
    })?;

    fields.insert(keys::FILENAME, file_stem(path));
    info!("{} parsed successfully", path.display());

    Ok(fields)
}

/// Parse one invoice file into a record owned by `user_id`.
///
/// The extractor is picked by file extension and the invoice id derived
/// from the file name, both according to `config`.
pub fn build_record(path: &Path, config: &HyresaviConfig, user_id: &str) -> crate::Result<InvoiceRecord> {
    let extractor = extractor_for(path, &config.pdf)?;
    let parser = RentalInvoiceParser::from_config(&config.extraction);

    let fields = parse_invoice_file(extractor.as_ref(), &parser, path)?;
    let invoice_id = invoice_id_for(path, &config.pipeline.invoice_id_prefix);

    Ok(InvoiceRecord::new(user_id, invoice_id, fields))
}
