//! Core types for the RAG crate.

use serde::{Deserialize, Serialize};

/// A window of a source document, the unit of embedding and retrieval.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Text content of the chunk, unmodified.
    pub text: String,
    /// `{source_file}_chunk_{start}`, where `start` is the character offset of the window.
    pub chunk_id: String,
    /// Original file name of the document.
    pub source_file: String,
}

impl Chunk {
    /// Creates a chunk starting at character offset `start` of `source_file`.
    #[must_use]
    pub fn new(text: impl Into<String>, source_file: impl Into<String>, start: usize) -> Self {
        let source_file = source_file.into();
        Self {
            text: text.into(),
            chunk_id: chunk_id(&source_file, start),
            source_file,
        }
    }

    /// Metadata record stored alongside this chunk's vector.
    #[must_use]
    pub fn metadata(&self) -> ChunkMetadata {
        ChunkMetadata {
            text: self.text.clone(),
            source_file: self.source_file.clone(),
            chunk_id: self.chunk_id.clone(),
        }
    }
}

/// Deterministic chunk identifier for a window of `source_file` at `start`.
#[must_use]
pub fn chunk_id(source_file: &str, start: usize) -> String {
    format!("{source_file}_chunk_{start}")
}

/// Metadata stored per vector-id.
///
/// Missing fields deserialize to empty strings so older or hand-edited files still load.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkMetadata {
    /// Chunk text.
    pub text: String,
    /// Original file name of the document.
    pub source_file: String,
    /// Identifier of the chunk inside its document.
    pub chunk_id: String,
}

impl From<Chunk> for ChunkMetadata {
    fn from(chunk: Chunk) -> Self {
        Self {
            text: chunk.text,
            source_file: chunk.source_file,
            chunk_id: chunk.chunk_id,
        }
    }
}

/// A search hit: raw distance plus the stored metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Squared L2 distance to the query; lower is more similar.
    pub score: f32,
    /// Metadata of the matching vector.
    pub metadata: ChunkMetadata,
}

/// Provenance of an answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Original file name of the document.
    pub source_file: String,
    /// Identifier of the chunk inside its document.
    pub chunk_id: String,
}

impl From<&ChunkMetadata> for Source {
    fn from(metadata: &ChunkMetadata) -> Self {
        Self {
            source_file: metadata.source_file.clone(),
            chunk_id: metadata.chunk_id.clone(),
        }
    }
}

/// Answer to a question together with the chunks it was grounded on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Generated answer or one of the fixed fallback strings.
    pub answer: String,
    /// Retrieved chunks in ranking order.
    pub sources: Vec<Source>,
}
