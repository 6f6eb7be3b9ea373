//! Text chunking for RAG.
//!
//! This module provides the [`Chunker`] trait and the [`FixedSizeChunker`]
//! used by ingestion.

mod fixed;

pub use fixed::FixedSizeChunker;

use crate::types::Chunk;

/// Trait for text chunking strategies.
///
/// Chunkers split one document's extracted text into pieces that are embedded and searched
/// individually. Chunk ids must be deterministic for a given `(source_file, text)` pair.
pub trait Chunker: Send + Sync {
    /// Splits `text` into chunks attributed to `source_file`.
    ///
    /// Empty text yields no chunks.
    fn chunk(&self, text: &str, source_file: &str) -> Vec<Chunk>;

    /// Returns the name of this chunking strategy.
    fn name(&self) -> &'static str;
}
