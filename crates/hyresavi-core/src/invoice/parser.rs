//! Rental invoice parser combining whole-document lookups and a line scan.

use std::time::Instant;

use tracing::{debug, info};

use crate::models::config::ExtractionConfig;
use crate::models::fields::{keys, ParsedInvoiceFields};

use super::rules::{
    breakdown::{pair_tokens, scan_breakdown},
    DueDateExtractor, FieldExtractor, OcrExtractor, TotalAmountExtractor, VatExtractor,
};
use super::Result;

/// Trait for invoice parsing.
pub trait InvoiceParser {
    /// Parse invoice fields from extracted text.
    fn parse(&self, text: &str) -> Result<ParsedInvoiceFields>;
}

/// Parser for the rental invoice ("hyresavi") template.
#[derive(Debug, Clone, Default)]
pub struct RentalInvoiceParser {
    /// Validate every breakdown pair, not only the token count.
    strict_pairing: bool,
}

impl RentalInvoiceParser {
    /// Create a parser with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser from extraction configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new().with_strict_pairing(config.strict_pairing)
    }

    /// Set strict breakdown pairing.
    pub fn with_strict_pairing(mut self, strict: bool) -> Self {
        self.strict_pairing = strict;
        self
    }

    /// Fields found by independent whole-document lookups.
    ///
    /// Covers the payment reference, due date, total amount and the
    /// single-line VAT entry. Never fails; a field that is not found is
    /// left out.
    pub fn extract_document_fields(&self, text: &str) -> ParsedInvoiceFields {
        let mut fields = ParsedInvoiceFields::new();

        if let Some(ocr) = OcrExtractor::new().extract(text) {
            fields.insert(keys::OCR, ocr);
        }

        if let Some(due_date) = DueDateExtractor::new().extract(text) {
            due_date.apply_to(&mut fields);
        }

        if let Some(total) = TotalAmountExtractor::new().extract(text) {
            fields.insert(keys::TOTAL_AMOUNT, total);
        }

        if let Some(vat) = VatExtractor::new().extract(text) {
            fields.insert(vat.key, vat.value);
        }

        fields
    }

    /// Label/value pairs of the rent and utility breakdown.
    pub fn extract_breakdown(&self, text: &str) -> Result<Vec<(String, String)>> {
        let tokens = scan_breakdown(text);
        debug!(
            "Rental breakdown: {:?}",
            tokens.iter().map(|t| t.as_str()).collect::<Vec<_>>()
        );
        pair_tokens(&tokens, self.strict_pairing)
    }
}

impl InvoiceParser for RentalInvoiceParser {
    fn parse(&self, text: &str) -> Result<ParsedInvoiceFields> {
        let start = Instant::now();

        info!("Parsing invoice from {} characters of text", text.len());

        let mut fields = self.extract_document_fields(text);
        for (label, value) in self.extract_breakdown(text)? {
            fields.insert(label, value);
        }

        debug!(
            "Extracted {} fields in {}ms",
            fields.len(),
            start.elapsed().as_millis()
        );

        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractionError;
    use pretty_assertions::assert_eq;

    const INVOICE: &str = "\
Wallenstam AB
Hyresavi
Lägenhet 1001, Storgatan 1
Avser perioden 2023-11-01 - 2023-11-30

Hyra
Kallvatten 4,2 m3
Varmvatten 1,8 m3
El enligt mätare 120 kWh

2 500
75
125
100

Moms: 700

Förfallodatum: 2023-11-01

Totalt att betala:

3 500

OCR 1297534008 #
";

    #[test]
    fn test_parse_full_invoice() {
        let fields = RentalInvoiceParser::new().parse(INVOICE).unwrap();

        assert_eq!(fields.due_date(), Some("01-11-2023"));
        assert_eq!(fields.number(keys::DUE_DATE_MONTH), Some(11));
        assert_eq!(fields.number(keys::DUE_DATE_YEAR), Some(2023));
        assert_eq!(fields.total_amount(), Some("3,500"));
        assert_eq!(fields.moms(), Some("700"));
        assert_eq!(fields.ocr(), Some("1297534008"));
        assert_eq!(fields.text(keys::HYRA), Some("2,500"));
        assert_eq!(fields.text(keys::KALLVATTEN), Some("75"));
        assert_eq!(fields.text(keys::VARMVATTEN), Some("125"));
        assert_eq!(fields.text(keys::EL), Some("100"));
        assert_eq!(fields.len(), 10);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let parser = RentalInvoiceParser::new();
        assert_eq!(parser.parse(INVOICE).unwrap(), parser.parse(INVOICE).unwrap());
    }

    #[test]
    fn test_strict_pairing_accepts_template() {
        let parser = RentalInvoiceParser::new().with_strict_pairing(true);
        assert!(parser.parse(INVOICE).is_ok());
    }

    #[test]
    fn test_missing_value_line_fails() {
        let text = INVOICE.replace("125\n", "");
        let err = RentalInvoiceParser::new().parse(&text).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::StructuralMismatch { count: 7, .. }
        ));
    }

    #[test]
    fn test_extra_charge_line_fails() {
        let text = INVOICE.replace("100\n", "100\n40\n");
        let err = RentalInvoiceParser::new().parse(&text).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_document_fields_survive_breakdown_failure() {
        let text = INVOICE.replace("125\n", "");
        let parser = RentalInvoiceParser::new();
        assert!(parser.parse(&text).is_err());

        let fields = parser.extract_document_fields(&text);
        assert_eq!(fields.moms(), Some("700"));
        assert_eq!(fields.total_amount(), Some("3,500"));
    }

    #[test]
    fn test_vat_after_due_date_is_found() {
        let text = "Hyra\n4 000\nFörfallodatum: 2024-03-15\nMoms: 173\n";
        let fields = RentalInvoiceParser::new().parse(text).unwrap();
        assert_eq!(fields.moms(), Some("173"));
        assert_eq!(fields.text(keys::HYRA), Some("4,000"));
        assert_eq!(fields.due_date(), Some("15-03-2024"));
    }

    #[test]
    fn test_optional_fields_absent() {
        let fields = RentalInvoiceParser::new().parse("Hyra\n4 000\n").unwrap();
        assert_eq!(fields.ocr(), None);
        assert_eq!(fields.moms(), None);
        assert_eq!(fields.due_date(), None);
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn test_unparseable_due_date() {
        let fields = RentalInvoiceParser::new()
            .parse("Förfallodatum: March\n")
            .unwrap();
        assert_eq!(fields.due_date(), Some("March"));
        assert_eq!(fields.due_period(), None);
    }

    #[test]
    fn test_due_date_with_trailing_comma() {
        let fields = RentalInvoiceParser::new()
            .parse("Förfallodatum: 2023-11-01,\n")
            .unwrap();
        assert_eq!(fields.due_date(), Some("01-11-2023"));
        assert_eq!(fields.due_period().map(|p| p.to_string()), Some("11/2023".to_string()));
    }

    #[test]
    fn test_free_text_due_date_not_truncated() {
        let fields = RentalInvoiceParser::new()
            .parse("Förfallodatum: 15 mars 2024\n")
            .unwrap();
        assert_eq!(fields.due_date(), Some("15 mars 2024"));
        assert_eq!(fields.due_period(), None);
    }

    #[test]
    fn test_last_vat_line_wins() {
        let fields = RentalInvoiceParser::new()
            .parse("Moms: 100\nHyra\n4 000\nMoms: 200\n")
            .unwrap();
        assert_eq!(fields.moms(), Some("200"));
        assert_eq!(fields.text(keys::HYRA), Some("4,000"));
    }

    #[test]
    fn test_vat_labelled_breakdown_line_is_only_a_token() {
        let text = "Hyra\nMervärdesskatt Moms: 25%\n4 000\n700\nFörfallodatum: 2024-01-31\n";
        let fields = RentalInvoiceParser::new().parse(text).unwrap();
        assert_eq!(fields.moms(), None);
        assert_eq!(fields.text("Mervärdesskatt Moms: 25%"), Some("700"));
    }
}
