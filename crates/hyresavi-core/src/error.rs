//! Error types for the hyresavi-core library.

use thiserror::Error;

/// Main error type for the hyresavi library.
#[derive(Error, Debug)]
pub enum HyresaviError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Invoice extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to text extraction from source files.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// The file type has no text extractor.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The source file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to invoice field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The breakdown section collected an odd number of tokens, so labels
    /// and values cannot be paired.
    #[error("structural mismatch: breakdown section has {count} tokens, expected an even number")]
    StructuralMismatch { count: usize, tokens: Vec<String> },

    /// Strict pairing found a label slot holding a value or a value slot
    /// holding a label.
    #[error("breakdown pair {index} is misaligned: {label:?} -> {value:?}")]
    MisalignedPair {
        index: usize,
        label: String,
        value: String,
    },

    /// Any other failure while producing the fields, with its cause.
    #[error("failed to parse invoice: {0}")]
    Parse(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ExtractionError {
    /// Wrap an arbitrary failure as a parse error.
    pub fn parse(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Parse(cause.into())
    }

    /// Whether this error indicates the vendor template was not matched.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::StructuralMismatch { .. } | Self::MisalignedPair { .. })
    }
}

/// Errors related to the local invoice store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing the store file failed.
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The store file is not valid JSON.
    #[error("corrupt store file: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Result type for the hyresavi library.
pub type Result<T> = std::result::Result<T, HyresaviError>;
