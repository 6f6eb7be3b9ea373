//! Error types for the RAG crate.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in RAG operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// Document content could not be read or decoded.
    #[error("text extraction failed for {file}: {reason}")]
    Extraction {
        /// Original file name of the document.
        file: String,
        /// Why extraction failed.
        reason: String,
    },

    /// The embedding service failed or answered with an unusable response.
    #[error("embedding failed: {0}")]
    Embedding(#[source] anyhow::Error),

    /// Dimension mismatch between a batch or query and the index.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension provided.
        actual: usize,
    },

    /// Persisted index files are unreadable or contradict each other.
    #[error("index corrupted: {0}")]
    Corrupted(String),

    /// The generation service failed or returned nothing.
    #[error("generation failed: {0}")]
    Generation(#[source] anyhow::Error),

    /// Configuration violates a precondition.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Vector index operation received malformed input.
    #[error("index error: {0}")]
    Index(String),

    /// Persistence operation failed.
    #[error("persistence error at {path}: {source}")]
    Persistence {
        /// Path where the error occurred.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// IO operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
