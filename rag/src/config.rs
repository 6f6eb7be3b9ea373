//! Configuration for RAG.

use std::path::{Path, PathBuf};

/// Default chunk window in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
/// Default overlap between consecutive windows in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;
/// Default number of chunks retrieved per question.
pub const DEFAULT_TOP_K: usize = 5;

/// Configuration for a RAG instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RagConfig {
    /// Root directory holding the index and uploaded documents.
    pub data_dir: PathBuf,
    /// Chunk window in characters.
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks.
    pub chunk_overlap: usize,
    /// Default number of results to return.
    pub default_top_k: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            default_top_k: DEFAULT_TOP_K,
        }
    }
}

impl RagConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for custom configuration.
    #[must_use]
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::new()
    }

    /// Directory holding the persisted index pair.
    #[must_use]
    pub fn index_dir(&self) -> PathBuf {
        self.data_dir.join("index")
    }

    /// Path of the serialized vector file.
    #[must_use]
    pub fn vectors_path(&self) -> PathBuf {
        self.index_dir().join("vectors.rkyv")
    }

    /// Path of the serialized metadata file.
    #[must_use]
    pub fn metadata_path(&self) -> PathBuf {
        self.index_dir().join("metadata.json")
    }

    /// Directory where accepted uploads are copied before ingestion.
    #[must_use]
    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir.join("uploads")
    }
}

/// Builder for RAG configuration.
#[derive(Debug, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Creates a new configuration builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: RagConfig::default(),
        }
    }

    /// Sets the data directory.
    #[must_use]
    pub fn data_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.config.data_dir = path.as_ref().to_path_buf();
        self
    }

    /// Sets the chunk window in characters.
    #[must_use]
    pub const fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Sets the overlap between consecutive chunks.
    #[must_use]
    pub const fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Sets the default number of results to return.
    #[must_use]
    pub const fn default_top_k(mut self, k: usize) -> Self {
        self.config.default_top_k = k;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> RagConfig {
        self.config
    }
}
