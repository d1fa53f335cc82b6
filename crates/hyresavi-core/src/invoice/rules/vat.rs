//! Single-line VAT ("Moms: 173") extraction.

use super::breakdown::{classify_line, SectionWindow};
use super::patterns::strip_noise;
use super::FieldExtractor;

/// Marker of the single-line VAT entry.
const MOMS_MARKER: &str = "Moms:";

/// A key/value pair read from a `Moms:` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VatLine {
    pub key: String,
    pub value: String,
}

/// Extracts the `Moms: <value>` line.
///
/// Every line is considered except the ones already taken as breakdown
/// tokens. When several `Moms:` lines remain, the last one wins.
#[derive(Debug, Default)]
pub struct VatExtractor;

impl VatExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for VatExtractor {
    type Output = VatLine;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let mut window = SectionWindow::new();

        text.lines()
            .filter(|line| !(window.advance(line) && classify_line(line).is_some()))
            .filter(|line| line.contains(MOMS_MARKER))
            .filter_map(parse_vat_line)
            .last()
    }
}

/// Split a `Moms:` line on `:` into a cleaned key and value.
///
/// The key is whatever precedes the first colon and the value what sits
/// between the first and second colon.
pub fn parse_vat_line(line: &str) -> Option<VatLine> {
    let mut parts = line.split(':');
    let key = strip_noise(parts.next()?);
    let value = strip_noise(parts.next()?);

    if key.is_empty() {
        return None;
    }

    Some(VatLine { key, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vat_line() {
        assert_eq!(
            parse_vat_line("Moms: 173"),
            Some(VatLine {
                key: "Moms".to_string(),
                value: "173".to_string()
            })
        );
        assert_eq!(
            parse_vat_line("*Moms: (700)*"),
            Some(VatLine {
                key: "Moms".to_string(),
                value: "700".to_string()
            })
        );
    }

    #[test]
    fn test_last_vat_line_wins() {
        let text = "Moms: 100\nHyra\n4 000\nMoms: 200\n";
        let vat = VatExtractor::new().extract(text).unwrap();
        assert_eq!(vat.value, "200");

        let text = "Hyra\nMoms: 173\nFörfallodatum: 2024-01-31\nMoms: 999";
        assert_eq!(VatExtractor::new().extract(text).unwrap().value, "999");
    }

    #[test]
    fn test_breakdown_label_is_not_vat() {
        let text = "Hyra\nMervärdesskatt Moms: 25%\n4 000\n700\nFörfallodatum: 2024-01-31";
        assert!(VatExtractor::new().extract(text).is_none());

        // Same line outside the section is read as VAT.
        let text = "Mervärdesskatt Moms: 25%\nHyra\n4 000\n";
        let vat = VatExtractor::new().extract(text).unwrap();
        assert_eq!(vat.key, "Mervärdesskatt Moms");
        assert_eq!(vat.value, "25%");
    }

    #[test]
    fn test_no_vat_line() {
        assert!(VatExtractor::new().extract("Mervärdesskatt 25%").is_none());
    }
}
