//! Text extraction from invoice files.

mod extractor;

pub use extractor::{extractor_for, PdfDocument, PdfExtractor, PlainTextExtractor};

use std::path::Path;

use crate::error::PdfError;

/// Type of PDF content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfType {
    /// Contains extractable text.
    Text,
    /// Contains only images (scanned document).
    Image,
    /// Contains both text and images.
    Hybrid,
    /// Empty or unreadable.
    Empty,
}

impl PdfType {
    /// Whether the document carries a text layer worth parsing.
    pub fn has_text(self) -> bool {
        matches!(self, Self::Text | Self::Hybrid)
    }
}

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Source of invoice text.
///
/// Implementations are opaque to the parser: whatever layout they return,
/// including extraction artifacts, is valid parser input.
pub trait TextExtractor {
    /// Extract the full text of the file at `path`.
    fn extract_text(&self, path: &Path) -> Result<String>;
}
