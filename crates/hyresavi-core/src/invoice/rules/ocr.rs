//! Payment reference (OCR number) extraction.

use super::patterns::OCR_REFERENCE;
use super::FieldExtractor;

/// Extracts the 10-digit payment reference.
#[derive(Debug, Default)]
pub struct OcrExtractor;

impl OcrExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for OcrExtractor {
    type Output = String;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        OCR_REFERENCE.captures(text).map(|caps| caps[1].to_string())
    }
}
