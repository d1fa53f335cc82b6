//! PDF text extraction using lopdf and pdf-extract.

use std::fs;
use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, trace, warn};

use super::{PdfType, Result, TextExtractor};
use crate::error::PdfError;
use crate::models::config::PdfConfig;

/// A loaded PDF document.
pub struct PdfDocument {
    document: Document,
    raw_data: Vec<u8>,
}

impl PdfDocument {
    /// Load a PDF from bytes, decrypting it with an empty password if
    /// `decrypt_empty_password` is set.
    pub fn load(data: &[u8], decrypt_empty_password: bool) -> Result<Self> {
        let mut document = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        let raw_data = if document.is_encrypted() {
            if !decrypt_empty_password || document.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract needs the decrypted bytes
            let mut decrypted_data = Vec::new();
            document
                .save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            decrypted_data
        } else {
            data.to_vec()
        };

        let page_count = document.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        Ok(Self { document, raw_data })
    }

    /// Extract text from the entire PDF.
    pub fn extract_text(&self) -> Result<String> {
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    /// Classify the document from its already extracted text and its page
    /// images.
    pub fn analyze(&self, text: &str, min_text_length: usize) -> PdfType {
        classify(text, self.count_page_images(), min_text_length)
    }

    /// Number of image XObjects referenced from page resources.
    fn count_page_images(&self) -> usize {
        let doc = &self.document;
        let mut count = 0;

        for (page_num, page_id) in doc.get_pages() {
            let Some(resources) = self.get_page_resources(page_id) else {
                continue;
            };
            let Ok(xobjects) = resources.get(b"XObject") else {
                continue;
            };
            let Ok((_, Object::Dictionary(xobj_dict))) = doc.dereference(xobjects) else {
                continue;
            };

            for (_name, obj_ref) in xobj_dict.iter() {
                if let Ok((_, Object::Stream(stream))) = doc.dereference(obj_ref) {
                    let is_image = stream
                        .dict
                        .get(b"Subtype")
                        .and_then(Object::as_name)
                        .map(|name| name == b"Image")
                        .unwrap_or(false);
                    if is_image {
                        trace!("Found image XObject on page {}", page_num);
                        count += 1;
                    }
                }
            }
        }

        count
    }

    /// Get resources dictionary for a page, handling inheritance.
    fn get_page_resources(&self, node_id: ObjectId) -> Option<Dictionary> {
        let doc = &self.document;
        let Object::Dictionary(dict) = doc.get_object(node_id).ok()? else {
            return None;
        };

        if let Ok(resources) = dict.get(b"Resources") {
            if let Ok((_, Object::Dictionary(res_dict))) = doc.dereference(resources) {
                return Some(res_dict.clone());
            }
        }

        // Continue up the page tree
        match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => self.get_page_resources(*parent_id),
            _ => None,
        }
    }
}

/// Classify a PDF by the non-whitespace length of its text and its image
/// count.
fn classify(text: &str, image_count: usize, min_text_length: usize) -> PdfType {
    let text_len = text.chars().filter(|c| !c.is_whitespace()).count();
    let has_text = text_len >= min_text_length;
    let has_images = image_count > 0;

    let pdf_type = match (has_text, has_images) {
        (true, false) => PdfType::Text,
        (false, true) => PdfType::Image,
        (true, true) => PdfType::Hybrid,
        (false, false) => PdfType::Empty,
    };

    debug!(
        "PDF analysis: {} chars text, {} images -> {:?}",
        text_len, image_count, pdf_type
    );
    pdf_type
}

/// Text extractor for PDF invoices.
#[derive(Debug, Clone)]
pub struct PdfExtractor {
    min_text_length: usize,
    decrypt_empty_password: bool,
}

impl PdfExtractor {
    /// Create a new PDF extractor with default settings.
    pub fn new() -> Self {
        Self::from_config(&PdfConfig::default())
    }

    /// Create a PDF extractor from configuration.
    pub fn from_config(config: &PdfConfig) -> Self {
        Self {
            min_text_length: config.min_text_length,
            decrypt_empty_password: config.decrypt_empty_password,
        }
    }

    /// Load a PDF from bytes and return its text.
    ///
    /// Image-only PDFs are rejected since their text would have to come from
    /// OCR.
    pub fn extract_from_bytes(&self, data: &[u8]) -> Result<String> {
        let document = PdfDocument::load(data, self.decrypt_empty_password)?;
        let text = document.extract_text()?;

        let pdf_type = document.analyze(&text, self.min_text_length);
        if !pdf_type.has_text() {
            warn!("PDF has no usable text layer ({:?})", pdf_type);
            return Err(PdfError::TextExtraction(format!(
                "no text layer found ({:?} PDF)",
                pdf_type
            )));
        }

        Ok(text)
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PdfExtractor {
    fn extract_text(&self, path: &Path) -> Result<String> {
        let data = fs::read(path).map_err(|source| PdfError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let text = self.extract_from_bytes(&data)?;
        debug!("Text extracted from {}: {} chars", path.display(), text.len());
        trace!("Extracted text:\n{}", text);
        Ok(text)
    }
}

/// Reads invoice text that was already extracted to a `.txt` file.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|source| PdfError::Read {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Pick a text extractor by file extension.
pub fn extractor_for(path: &Path, config: &PdfConfig) -> Result<Box<dyn TextExtractor + Send + Sync>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "pdf" => Ok(Box::new(PdfExtractor::from_config(config))),
        "txt" => Ok(Box::new(PlainTextExtractor)),
        _ => Err(PdfError::UnsupportedFormat(extension)),
    }
}
