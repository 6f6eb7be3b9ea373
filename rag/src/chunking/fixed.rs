//! Fixed-size text chunking.

use crate::config::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use crate::error::{RagError, Result};
use crate::types::Chunk;

use super::Chunker;

/// Chunks text into fixed-size character windows with overlap.
///
/// Windows start at offset 0 and advance by `chunk_size - overlap` characters. The last window
/// may be shorter and is emitted once. Offsets count Unicode scalar values, not bytes, and the
/// text is never normalized.
///
/// # Example
///
/// ```rust
/// use docqa_rag::chunking::{Chunker, FixedSizeChunker};
///
/// let chunker = FixedSizeChunker::new(10, 2).unwrap();
/// let chunks = chunker.chunk("abcdefghijklmnop", "doc.txt");
/// assert_eq!(chunks.len(), 2);
/// assert_eq!(chunks[1].chunk_id, "doc.txt_chunk_8");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSizeChunker {
    /// Maximum size of each chunk in characters.
    chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    overlap: usize,
}

impl FixedSizeChunker {
    /// Creates a new fixed-size chunker.
    ///
    /// # Errors
    /// Returns [`RagError::InvalidConfig`] if `chunk_size` is zero or `overlap >= chunk_size`,
    /// since the window would never advance.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::InvalidConfig("chunk_size must be positive".into()));
        }
        if overlap >= chunk_size {
            return Err(RagError::InvalidConfig(format!(
                "overlap ({overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Window size in characters.
    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Overlap in characters.
    #[must_use]
    pub const fn overlap(&self) -> usize {
        self.overlap
    }

    const fn step(&self) -> usize {
        self.chunk_size - self.overlap
    }
}

impl Default for FixedSizeChunker {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, text: &str, source_file: &str) -> Vec<Chunk> {
        // Byte offset of every character boundary, including the end of the text.
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(idx, _)| idx)
            .chain(std::iter::once(text.len()))
            .collect();
        let len = bounds.len() - 1;

        let mut chunks = Vec::new();
        let mut start = 0;
        while start < len {
            let end = (start + self.chunk_size).min(len);
            chunks.push(Chunk::new(
                &text[bounds[start]..bounds[end]],
                source_file,
                start,
            ));
            if end >= len {
                break;
            }
            start += self.step();
        }
        chunks
    }

    fn name(&self) -> &'static str {
        "fixed_size"
    }
}
