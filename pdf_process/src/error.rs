use thiserror::Error;

/// Errors emitted while extracting document text.
#[derive(Debug, Error)]
pub enum PdfProcessError {
    /// The input bytes do not decode as a valid PDF structure.
    #[error("failed to parse PDF: {0}")]
    Parse(String),
    /// The source document could not be read from the filesystem.
    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),
    /// A plain-text document is not valid UTF-8.
    #[error("document is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
    /// The file extension is neither `.pdf` nor `.txt`.
    #[error("unsupported document type: {0}")]
    Unsupported(String),
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, PdfProcessError>;
