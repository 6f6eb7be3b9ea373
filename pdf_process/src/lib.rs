//! Document text extraction for ingestion.
//!
//! PDFs are decoded with `lopdf`; every page that yields text contributes that text followed by a
//! newline. Plain-text files are read as UTF-8 without modification.

mod error;
mod parser;

pub use error::{PdfProcessError, Result};

use std::path::{Path, PathBuf};

/// Document formats accepted for ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Portable Document Format.
    Pdf,
    /// UTF-8 plain text.
    Text,
}

impl DocumentKind {
    /// Detect the kind from a file name or path, ignoring extension case.
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::Text),
            _ => None,
        }
    }

    /// Canonical lowercase extension including the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Pdf => ".pdf",
            Self::Text => ".txt",
        }
    }
}

/// Extract the full text of a `.pdf` or `.txt` document.
///
/// This is blocking I/O; async callers should run it on a blocking thread.
pub fn extract_document(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let kind = DocumentKind::from_path(path)
        .ok_or_else(|| PdfProcessError::Unsupported(path.display().to_string()))?;
    extract_as(path, kind)
}

/// Extract text from `path`, treating it as `kind` regardless of its own extension.
///
/// Uploads are often stored under generated names; the kind then comes from the original file
/// name.
pub fn extract_as(path: impl AsRef<Path>, kind: DocumentKind) -> Result<String> {
    let path = path.as_ref();
    match kind {
        DocumentKind::Pdf => PdfProcessor::from_path(path).extract_text(),
        DocumentKind::Text => Ok(String::from_utf8(std::fs::read(path)?)?),
    }
}

/// PDF processor entrypoint.
#[derive(Debug, Clone)]
pub struct PdfProcessor {
    source: PdfSource,
}

#[derive(Debug, Clone)]
enum PdfSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl PdfProcessor {
    /// Build a processor from a PDF file path.
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: PdfSource::Path(path.into()),
        }
    }

    /// Build a processor from PDF bytes.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            source: PdfSource::Bytes(bytes.into()),
        }
    }

    /// Text of each page in order, including empty strings for pages without text.
    pub fn page_texts(&self) -> Result<Vec<String>> {
        let doc = self.load()?;
        Ok(parser::page_texts(&doc))
    }

    /// Concatenated text of all pages that yield any.
    pub fn extract_text(&self) -> Result<String> {
        let pages = self.page_texts()?;
        let text = parser::join_pages(&pages);
        tracing::debug!(pages = pages.len(), chars = text.chars().count(), "extracted PDF text");
        Ok(text)
    }

    /// Returns source path if available.
    #[must_use]
    pub fn source_path(&self) -> Option<&Path> {
        match &self.source {
            PdfSource::Path(path) => Some(path.as_path()),
            PdfSource::Bytes(_) => None,
        }
    }

    fn load(&self) -> Result<lopdf::Document> {
        match &self.source {
            PdfSource::Path(path) => parser::load_from_path(path),
            PdfSource::Bytes(bytes) => parser::load_from_bytes(bytes),
        }
    }
}
