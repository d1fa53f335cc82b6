//! Amount extraction and thousands-separator normalization.

use super::patterns::TOTAL_AMOUNT;
use super::FieldExtractor;

/// Extracts the "Totalt att betala" amount, normalized with commas.
#[derive(Debug, Default)]
pub struct TotalAmountExtractor;

impl TotalAmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for TotalAmountExtractor {
    type Output = String;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        TOTAL_AMOUNT
            .captures(text)
            .map(|caps| normalize_thousands(&caps[1]))
    }
}

/// Replace the space thousands separators of a Swedish amount with commas.
///
/// `"1 234"` becomes `"1,234"`. Runs of spaces (including non-breaking
/// spaces) collapse into one separator and outer whitespace is dropped.
pub fn normalize_thousands(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(",")
}
