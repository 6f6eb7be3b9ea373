//! Durable storage of the index as a pair of files.
//!
//! `vectors.rkyv` holds the contiguous vector data; `metadata.json` holds the metadata table
//! plus an xxh3 checksum of the exact vector file bytes it was written with, so the two files
//! are validated as one unit on load. Each file is written to a temporary sibling and renamed
//! into place.

mod rkyv_backend;

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::checksum::checksum;
use crate::config::RagConfig;
use crate::error::{RagError, Result};
use crate::index::FlatIndex;
use crate::types::ChunkMetadata;

use rkyv_backend::VectorFile;

/// Version written to and expected in `metadata.json`.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct MetadataFile {
    version: u32,
    vectors_checksum: u64,
    entries: BTreeMap<u64, ChunkMetadata>,
}

/// Locations of the persisted vector and metadata files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexFiles {
    vectors: PathBuf,
    metadata: PathBuf,
}

impl IndexFiles {
    /// Creates a file pair from explicit paths.
    #[must_use]
    pub fn new(vectors: impl Into<PathBuf>, metadata: impl Into<PathBuf>) -> Self {
        Self {
            vectors: vectors.into(),
            metadata: metadata.into(),
        }
    }

    /// Uses the paths derived from `config.data_dir`.
    #[must_use]
    pub fn from_config(config: &RagConfig) -> Self {
        Self::new(config.vectors_path(), config.metadata_path())
    }

    /// Path of the vector file.
    #[must_use]
    pub fn vectors_path(&self) -> &Path {
        &self.vectors
    }

    /// Path of the metadata file.
    #[must_use]
    pub fn metadata_path(&self) -> &Path {
        &self.metadata
    }

    /// Writes both files. The caller must not pass an empty index.
    ///
    /// # Errors
    /// Returns [`RagError::Persistence`] if either file cannot be written.
    pub fn save(&self, index: &FlatIndex) -> Result<()> {
        let dimension = index.dimension().unwrap_or(0) as u64;
        let vector_bytes = rkyv_backend::encode(&VectorFile {
            dimension,
            data: index.vectors().to_vec(),
        })?;
        let metadata = MetadataFile {
            version: FORMAT_VERSION,
            vectors_checksum: checksum(&vector_bytes),
            entries: index.entries().clone(),
        };
        let metadata_bytes = serde_json::to_vec_pretty(&metadata)
            .map_err(|e| RagError::Serialization(e.to_string()))?;

        write_atomic(&self.vectors, &vector_bytes)?;
        write_atomic(&self.metadata, &metadata_bytes)?;
        Ok(())
    }

    /// Reads both files back into an index.
    ///
    /// Returns `Ok(None)` when no index has been persisted, including the case where only one
    /// of the two files exists (logged as a warning).
    ///
    /// # Errors
    /// Returns [`RagError::Corrupted`] if the files cannot be decoded or contradict each other,
    /// and [`RagError::Persistence`] if an existing file cannot be read.
    pub fn load(&self) -> Result<Option<FlatIndex>> {
        match (self.vectors.exists(), self.metadata.exists()) {
            (false, false) => return Ok(None),
            (true, true) => {}
            (vectors, metadata) => {
                tracing::warn!(
                    vectors = vectors,
                    metadata = metadata,
                    path = %self.vectors.display(),
                    "only one index file present; starting with an empty index"
                );
                return Ok(None);
            }
        }

        let vector_bytes = read(&self.vectors)?;
        let metadata_bytes = read(&self.metadata)?;

        let metadata: MetadataFile = serde_json::from_slice(&metadata_bytes)
            .map_err(|e| RagError::Corrupted(format!("metadata file: {e}")))?;
        if metadata.version != FORMAT_VERSION {
            return Err(RagError::Corrupted(format!(
                "unsupported metadata version {}",
                metadata.version
            )));
        }
        if metadata.vectors_checksum != checksum(&vector_bytes) {
            return Err(RagError::Corrupted(
                "vector file does not match the metadata checksum".into(),
            ));
        }

        let vectors = rkyv_backend::decode(&vector_bytes)?;
        let dimension = usize::try_from(vectors.dimension)
            .map_err(|_| RagError::Corrupted("dimension out of range".into()))?;
        FlatIndex::from_parts(dimension, vectors.data, metadata.entries).map(Some)
    }
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| RagError::Persistence {
        path: path.to_path_buf(),
        source,
    })
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let persistence_err = |source| RagError::Persistence {
        path: path.to_path_buf(),
        source,
    };
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(persistence_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(persistence_err)?;
    tmp.write_all(bytes).map_err(persistence_err)?;
    tmp.as_file().sync_all().map_err(persistence_err)?;
    tmp.persist(path).map_err(|e| persistence_err(e.error))?;
    Ok(())
}
