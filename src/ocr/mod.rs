//! Text extraction from uploaded documents.
//!
//! The default [`TesseractExtractor`] shells out to Poppler and Tesseract:
//! - images are passed straight to `tesseract`
//! - PDFs are rasterized with `pdftoppm` and each page image is OCR'd in order
//! - plain text is read as-is
//!
//! Other engines plug in through the [`Extractor`] trait.

mod pdf_utils;
mod tesseract;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use pdf_utils::parse_pdfinfo_pages;
pub use tesseract::TesseractExtractor;

/// Errors that can occur during text extraction.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("Extraction failed: {0}")]
    Failed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// How text was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    /// OCR of an image file.
    ImageOcr,
    /// PDF rasterized page by page, then OCR'd.
    PdfOcr,
    /// File was already text.
    PlainText,
}

/// Result of text extraction.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Extracted text, pages joined in order.
    pub text: String,
    pub method: ExtractionMethod,
    /// Number of pages processed.
    pub page_count: Option<u32>,
}

/// Converts a stored upload into plain text.
pub trait Extractor: Send + Sync {
    /// Extract text from the file at `path` with the given MIME type.
    fn extract(&self, path: &Path, mime_type: &str) -> Result<Extraction, ExtractionError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// OCR settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Tesseract language code(s), e.g. `eng` or `eng+deu`.
    #[serde(default = "default_language")]
    pub language: String,
    /// Resolution used when rasterizing PDF pages.
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    /// Directory holding `pdfinfo`, `pdftoppm` and `tesseract`. PATH is
    /// searched when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools_dir: Option<PathBuf>,
}

fn default_language() -> String {
    "eng".to_string()
}

fn default_dpi() -> u32 {
    300
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            dpi: default_dpi(),
            tools_dir: None,
        }
    }
}

impl OcrConfig {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Whether a MIME type is an image Tesseract can read.
pub fn is_supported_image(mime_type: &str) -> bool {
    matches!(
        mime_type,
        "image/png" | "image/jpeg" | "image/tiff" | "image/bmp" | "image/gif" | "image/webp"
    )
}

/// Whether any extractor path handles this MIME type.
pub fn is_supported(mime_type: &str) -> bool {
    is_supported_image(mime_type) || mime_type == "application/pdf" || mime_type == "text/plain"
}
