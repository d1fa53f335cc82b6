//! Configuration structures for the invoice pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::record::DEFAULT_INVOICE_ID_PREFIX;
use crate::error::{HyresaviError, Result};

/// Main configuration for the hyresavi pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HyresaviConfig {
    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Invoice extraction configuration.
    pub extraction: ExtractionConfig,

    /// Record identity and storage configuration.
    pub pipeline: PipelineConfig,
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum text length to consider a PDF as text-based.
    pub min_text_length: usize,

    /// Try an empty password on encrypted PDFs.
    pub decrypt_empty_password: bool,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            min_text_length: 30,
            decrypt_empty_password: true,
        }
    }
}

/// Invoice extraction configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Check every breakdown pair (label slot holds a category line, value
    /// slot holds a number) instead of only the even token count.
    pub strict_pairing: bool,
}

/// Record identity and storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// User id attached to records when none is given on the command line.
    pub default_user: Option<String>,

    /// Prefix for invoice ids derived from file names.
    pub invoice_id_prefix: String,

    /// Local record store used to skip already processed months.
    pub store_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_user: None,
            invoice_id_prefix: DEFAULT_INVOICE_ID_PREFIX.to_string(),
            store_path: None,
        }
    }
}

impl HyresaviConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            HyresaviError::Config(format!("{}: {}", path.display(), e))
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| HyresaviError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
