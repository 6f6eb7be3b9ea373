//! Shared, durable vector store.

use std::collections::BTreeMap;
use std::ops::Range;

use parking_lot::{RwLock, RwLockWriteGuard};

use crate::error::{RagError, Result};
use crate::index::FlatIndex;
use crate::persistence::IndexFiles;
use crate::types::{ChunkMetadata, SearchResult};

/// Log target for signals operators should alert on.
pub const ALERT_TARGET: &str = "docqa_rag::alert";

/// The single shared index used by ingestion and retrieval.
///
/// All mutation goes through one write lock, so vector-ids are assigned exactly once even when
/// ingestions overlap. [`commit`](Self::commit) appends and persists as one step: the write guard
/// is downgraded to a read guard for the disk write, so searches may proceed while no other
/// writer can slip in between the append and the save.
///
/// Every method here may block on disk I/O or lock contention; async callers should use
/// `spawn_blocking` for [`load`](Self::load), [`save`](Self::save) and
/// [`commit`](Self::commit).
#[derive(Debug)]
pub struct VectorStore {
    index: RwLock<FlatIndex>,
    files: IndexFiles,
}

impl VectorStore {
    /// Creates an empty store that persists to `files`. Nothing is read from disk.
    #[must_use]
    pub fn new(files: IndexFiles) -> Self {
        Self {
            index: RwLock::new(FlatIndex::new()),
            files,
        }
    }

    /// Creates a store and loads whatever is persisted at `files`.
    #[must_use]
    pub fn open(files: IndexFiles) -> Self {
        let store = Self::new(files);
        store.load();
        store
    }

    /// Replaces the in-memory index with the persisted one and returns the loaded vector count.
    ///
    /// Missing files yield an empty index. Unreadable or inconsistent files also yield an empty
    /// index; that case is logged on [`ALERT_TARGET`] because previously ingested data is no
    /// longer served.
    pub fn load(&self) -> usize {
        let loaded = match self.files.load() {
            Ok(Some(index)) => index,
            Ok(None) => FlatIndex::new(),
            Err(err) => {
                tracing::error!(
                    target: ALERT_TARGET,
                    error = %err,
                    vectors = %self.files.vectors_path().display(),
                    metadata = %self.files.metadata_path().display(),
                    "index files unusable; starting with an empty index"
                );
                FlatIndex::new()
            }
        };
        let count = loaded.len();
        *self.index.write() = loaded;
        tracing::info!(vectors = count, "index loaded");
        count
    }

    /// Appends a batch without persisting it.
    ///
    /// # Errors
    /// See [`FlatIndex::add`]; a rejected batch is logged and the index is left unchanged.
    pub fn add(&self, vectors: &[Vec<f32>], metadatas: Vec<ChunkMetadata>) -> Result<Range<u64>> {
        let mut index = self.index.write();
        Self::add_locked(&mut index, vectors, metadatas)
    }

    /// Persists the current index. An empty index is never written.
    ///
    /// # Errors
    /// Returns [`RagError::Persistence`] if the files cannot be written.
    pub fn save(&self) -> Result<()> {
        let index = self.index.read();
        self.save_locked(&index)
    }

    /// Appends a batch and persists the result before any other writer can run.
    ///
    /// # Errors
    /// Fails if the batch is rejected (nothing changes) or if persisting fails (the batch stays
    /// in memory and will be written by the next successful save).
    pub fn commit(
        &self,
        vectors: &[Vec<f32>],
        metadatas: Vec<ChunkMetadata>,
    ) -> Result<Range<u64>> {
        let mut index = self.index.write();
        let ids = Self::add_locked(&mut index, vectors, metadatas)?;
        if ids.is_empty() {
            return Ok(ids);
        }
        let index = RwLockWriteGuard::downgrade(index);
        self.save_locked(&index)?;
        Ok(ids)
    }

    /// Exact search over the current index.
    ///
    /// # Errors
    /// Returns [`RagError::DimensionMismatch`] if the query length differs from the index
    /// dimension.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        self.index.read().search(query, top_k)
    }

    /// Number of stored vectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    /// Returns `true` if nothing has been ingested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.read().is_empty()
    }

    /// Fixed vector dimension, or `None` while empty.
    #[must_use]
    pub fn dimension(&self) -> Option<usize> {
        self.index.read().dimension()
    }

    /// Distinct source files with their chunk counts.
    #[must_use]
    pub fn sources(&self) -> BTreeMap<String, usize> {
        self.index.read().sources()
    }

    /// Clone of the current index, for inspection.
    #[must_use]
    pub fn snapshot(&self) -> FlatIndex {
        self.index.read().clone()
    }

    /// Persisted file locations.
    #[must_use]
    pub const fn files(&self) -> &IndexFiles {
        &self.files
    }

    fn add_locked(
        index: &mut FlatIndex,
        vectors: &[Vec<f32>],
        metadatas: Vec<ChunkMetadata>,
    ) -> Result<Range<u64>> {
        match index.add(vectors, metadatas) {
            Ok(ids) => {
                if !ids.is_empty() {
                    tracing::debug!(first = ids.start, count = ids.end - ids.start, "vectors added");
                }
                Ok(ids)
            }
            Err(err) => {
                if let RagError::DimensionMismatch { expected, actual } = &err {
                    tracing::warn!(expected, actual, "dropping batch with mismatched dimension");
                } else {
                    tracing::warn!(error = %err, "dropping malformed batch");
                }
                Err(err)
            }
        }
    }

    fn save_locked(&self, index: &FlatIndex) -> Result<()> {
        if index.is_empty() {
            tracing::warn!("index is empty; nothing to save");
            return Ok(());
        }
        self.files.save(index)?;
        tracing::debug!(
            vectors = index.len(),
            path = %self.files.vectors_path().display(),
            "index saved"
        );
        Ok(())
    }
}
