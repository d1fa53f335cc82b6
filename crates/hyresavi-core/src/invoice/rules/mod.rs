//! Rule-based field extractors for the rental invoice template.

pub mod amounts;
pub mod breakdown;
pub mod dates;
pub mod ocr;
pub mod patterns;
pub mod vat;

pub use amounts::{normalize_thousands, TotalAmountExtractor};
pub use breakdown::{
    classify_line, pair_tokens, scan_breakdown, BreakdownToken, SectionWindow, CATEGORY_MARKERS,
};
pub use dates::{convert_due_date, DueDate, DueDateExtractor};
pub use ocr::OcrExtractor;
pub use patterns::strip_noise;
pub use vat::{parse_vat_line, VatExtractor, VatLine};

/// Trait for field extractors.
///
/// Each extractor looks at the whole document on its own; a missing field
/// is `None`, never an error.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from the whole text.
    fn extract(&self, text: &str) -> Option<Self::Output>;
}
