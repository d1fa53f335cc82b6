//! Rent and utility breakdown extraction.
//!
//! The template prints category labels and their amounts in two columns.
//! Flattened to text they become one run of label lines followed by one run
//! of value lines, so the section is collected as a flat token sequence and
//! split at its midpoint: the first half are labels, the second half the
//! values in the same order.

use tracing::{debug, trace};

use super::amounts::normalize_thousands;
use super::patterns::strip_noise;
use crate::error::ExtractionError;
use crate::models::fields::keys;

/// Category markers of the vendor template, matched on lowercased lines.
///
/// This vocabulary is fixed to one vendor's Swedish rental invoices.
pub const CATEGORY_MARKERS: [&str; 5] = [
    "hyra",
    "kallvatten",
    "varmvatten",
    "el enligt",
    "mervärdesskatt",
];

/// Line that opens the breakdown section.
pub const SECTION_START: &str = "Hyra";

/// Line that closes the breakdown section.
pub const SECTION_END: &str = "Förfallodatum";

/// A relevant line inside the breakdown section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakdownToken {
    /// Category label, already normalized for the fixed prefixes.
    Label(String),
    /// Bare numeric line.
    Value(String),
}

impl BreakdownToken {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Label(s) | Self::Value(s) => s,
        }
    }

    pub fn is_label(&self) -> bool {
        matches!(self, Self::Label(_))
    }
}

/// Classify one line of the breakdown section.
///
/// Returns `None` for lines that are neither a category label nor a bare
/// number.
pub fn classify_line(line: &str) -> Option<BreakdownToken> {
    let lower = line.trim_start().to_lowercase();

    if CATEGORY_MARKERS.iter().any(|marker| lower.contains(marker)) {
        let label = if lower.starts_with("kallvatten") {
            keys::KALLVATTEN.to_string()
        } else if lower.starts_with("varmvatten") {
            keys::VARMVATTEN.to_string()
        } else if lower.starts_with("el enligt") {
            keys::EL.to_string()
        } else {
            line.to_string()
        };
        return Some(BreakdownToken::Label(label));
    }

    if is_bare_number(line) {
        return Some(BreakdownToken::Value(line.to_string()));
    }

    None
}

/// Digits only, once spaces and asterisks are removed.
fn is_bare_number(line: &str) -> bool {
    let mut digits = line
        .chars()
        .filter(|c| !matches!(c, ' ' | '\u{00a0}' | '*'))
        .peekable();

    digits.peek().is_some() && digits.all(|c| c.is_ascii_digit())
}

/// Tracks which lines belong to the breakdown section.
///
/// The section opens at the first line containing `Hyra` and closes for
/// good at the first `Förfallodatum` line after that; neither end line is
/// part of it when it also closes the section.
#[derive(Debug, Default)]
pub struct SectionWindow {
    recording: bool,
    closed: bool,
}

impl SectionWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next line; true when it lies inside the section.
    pub fn advance(&mut self, line: &str) -> bool {
        if self.closed {
            return false;
        }

        if !self.recording && line.contains(SECTION_START) {
            self.recording = true;
        }

        if self.recording && line.contains(SECTION_END) {
            self.recording = false;
            self.closed = true;
        }

        self.recording
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Collect the relevant lines of the breakdown section, in document order.
pub fn scan_breakdown(text: &str) -> Vec<BreakdownToken> {
    let mut tokens = Vec::new();
    let mut window = SectionWindow::new();

    for line in text.lines() {
        if !window.advance(line) {
            if window.is_closed() {
                break;
            }
            continue;
        }

        match classify_line(line) {
            Some(token) => {
                trace!("Breakdown token: {:?}", token);
                tokens.push(token);
            }
            None => trace!("Skipping line: {:?}", line),
        }
    }

    debug!("Collected {} breakdown tokens", tokens.len());
    tokens
}

/// Pair breakdown tokens by splitting them at the midpoint.
///
/// Fails with [`ExtractionError::StructuralMismatch`] before pairing
/// anything when the count is odd. With `strict` set, every label slot must
/// hold a label and every value slot a number, otherwise the first offending
/// pair fails with [`ExtractionError::MisalignedPair`].
///
/// Noise is stripped from both sides and the rent value gets comma
/// thousands separators.
pub fn pair_tokens(
    tokens: &[BreakdownToken],
    strict: bool,
) -> Result<Vec<(String, String)>, ExtractionError> {
    if tokens.len() % 2 != 0 {
        return Err(ExtractionError::StructuralMismatch {
            count: tokens.len(),
            tokens: tokens.iter().map(|t| t.as_str().to_string()).collect(),
        });
    }

    let (labels, values) = tokens.split_at(tokens.len() / 2);
    let mut pairs = Vec::with_capacity(labels.len());

    for (index, (label, value)) in labels.iter().zip(values).enumerate() {
        if strict && (!label.is_label() || value.is_label()) {
            return Err(ExtractionError::MisalignedPair {
                index,
                label: label.as_str().to_string(),
                value: value.as_str().to_string(),
            });
        }

        let key = strip_noise(label.as_str());
        let mut amount = strip_noise(value.as_str());
        if key == keys::HYRA {
            amount = normalize_thousands(&amount);
        }
        pairs.push((key, amount));
    }

    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn label(s: &str) -> BreakdownToken {
        BreakdownToken::Label(s.to_string())
    }

    fn value(s: &str) -> BreakdownToken {
        BreakdownToken::Value(s.to_string())
    }

    #[test]
    fn test_classify_prefixed_labels() {
        assert_eq!(
            classify_line("Kallvatten 12,5 m3 à 45 kr"),
            Some(label("Kallvatten"))
        );
        assert_eq!(
            classify_line("VARMVATTEN enligt mätare"),
            Some(label("Varmvatten"))
        );
        assert_eq!(
            classify_line("El enligt avläsning 2023-10"),
            Some(label("El"))
        );
    }

    #[test]
    fn test_classify_keeps_other_categories_verbatim() {
        assert_eq!(classify_line("Hyra"), Some(label("Hyra")));
        assert_eq!(
            classify_line("Mervärdesskatt (25%)"),
            Some(label("Mervärdesskatt (25%)"))
        );
        assert_eq!(classify_line("Garagehyra"), Some(label("Garagehyra")));
    }

    #[test]
    fn test_classify_numbers() {
        assert_eq!(classify_line("5 000"), Some(value("5 000")));
        assert_eq!(classify_line("**173**"), Some(value("**173**")));
        assert_eq!(classify_line("12,50"), None);
        assert_eq!(classify_line(""), None);
        assert_eq!(classify_line(" * "), None);
        assert_eq!(classify_line("Period 2023-11"), None);
    }

    #[test]
    fn test_scan_window() {
        let text = "Lägenhet 1001\n123\nHyra\nKallvatten m3\n5 000\n250\nFörfallodatum: 2023-11-01\nHyra\n999";
        let tokens = scan_breakdown(text);
        assert_eq!(
            tokens,
            vec![label("Hyra"), label("Kallvatten"), value("5 000"), value("250")]
        );
    }

    #[test]
    fn test_due_date_before_section_does_not_stop_scan() {
        let text = "Förfallodatum: 2023-11-01\nHyra\n5 000";
        assert_eq!(scan_breakdown(text), vec![label("Hyra"), value("5 000")]);
    }

    #[test]
    fn test_pair_tokens() {
        let tokens = vec![
            label("*Hyra*"),
            label("Kallvatten"),
            value("5 000"),
            value("(250)"),
        ];
        let pairs = pair_tokens(&tokens, false).unwrap();
        assert_eq!(
            pairs,
            vec![
                ("Hyra".to_string(), "5,000".to_string()),
                ("Kallvatten".to_string(), "250".to_string()),
            ]
        );
    }

    #[test]
    fn test_only_rent_gets_separators() {
        let tokens = vec![label("El enligt"), value("1 200")];
        let pairs = pair_tokens(&tokens, false).unwrap();
        assert_eq!(pairs[0].1, "1 200");
    }

    #[test]
    fn test_odd_count_is_structural_mismatch() {
        let tokens = vec![label("Hyra"), label("Kallvatten"), value("5 000")];
        let err = pair_tokens(&tokens, false).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::StructuralMismatch { count: 3, .. }
        ));
        assert!(err.is_structural());
    }

    #[test]
    fn test_strict_pairing_rejects_misaligned_pair() {
        let tokens = vec![label("Hyra"), value("5 000"), value("250"), value("120")];
        assert!(pair_tokens(&tokens, false).is_ok());

        let err = pair_tokens(&tokens, true).unwrap_err();
        match err {
            ExtractionError::MisalignedPair { index, label, .. } => {
                assert_eq!(index, 1);
                assert_eq!(label, "5 000");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_section_pairs_to_nothing() {
        assert!(pair_tokens(&[], true).unwrap().is_empty());
    }
}
