//! Document ingestion: extract, chunk, embed, append, persist.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::anyhow;
use docqa_core::EmbeddingModel;
use docqa_pdf_process::{DocumentKind, extract_as};
use tokio::task::JoinHandle;

use crate::chunking::Chunker;
use crate::error::{RagError, Result};
use crate::store::VectorStore;
use crate::types::ChunkMetadata;

/// Result of one successful ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    /// Original file name the chunks are attributed to.
    pub source_file: String,
    /// Number of chunks added; zero when the document had no text.
    pub chunks: usize,
    /// Vectors in the index after this ingestion.
    pub total_vectors: usize,
}

/// Runs documents through the ingestion pipeline into a shared [`VectorStore`].
///
/// Re-ingesting a file appends a second, independent set of chunks; nothing is replaced or
/// deduplicated.
pub struct Ingestor<E> {
    embedder: Arc<E>,
    store: Arc<VectorStore>,
    chunker: Arc<dyn Chunker>,
}

impl<E> Clone for Ingestor<E> {
    fn clone(&self) -> Self {
        Self {
            embedder: Arc::clone(&self.embedder),
            store: Arc::clone(&self.store),
            chunker: Arc::clone(&self.chunker),
        }
    }
}

impl<E> std::fmt::Debug for Ingestor<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ingestor")
            .field("store", &self.store)
            .field("chunker", &self.chunker.name())
            .finish_non_exhaustive()
    }
}

impl<E> Ingestor<E>
where
    E: EmbeddingModel + 'static,
{
    /// Creates an ingestor writing into `store`.
    pub fn new(embedder: Arc<E>, store: Arc<VectorStore>, chunker: Arc<dyn Chunker>) -> Self {
        Self {
            embedder,
            store,
            chunker,
        }
    }

    /// Ingests one document and reports what happened.
    ///
    /// `path` is where the bytes live; `filename` is the original name, used both to pick the
    /// extractor and as the `source_file` of every chunk.
    ///
    /// # Errors
    /// - [`RagError::Extraction`] if the document cannot be read or has an unsupported type
    /// - [`RagError::Embedding`] if the embedding call fails or returns the wrong number of
    ///   vectors
    /// - [`RagError::DimensionMismatch`] if the vectors disagree with the index dimension
    ///
    /// The index is untouched in all of these cases.
    pub async fn try_ingest(&self, path: impl AsRef<Path>, filename: &str) -> Result<IngestOutcome> {
        tracing::info!(file = %filename, "starting ingestion");

        let text = extract(path.as_ref().to_path_buf(), filename).await?;
        tracing::info!(
            file = %filename,
            chars = text.chars().count(),
            "text extraction complete"
        );

        let chunks = self.chunker.chunk(&text, filename);
        if chunks.is_empty() {
            tracing::warn!(file = %filename, "no text extracted; skipping embeddings");
            return Ok(IngestOutcome {
                source_file: filename.to_owned(),
                chunks: 0,
                total_vectors: self.store.len(),
            });
        }
        tracing::info!(file = %filename, chunks = chunks.len(), "document chunked");

        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let vectors = self
            .embedder
            .embed_batch(&texts)
            .await
            .map_err(RagError::Embedding)?;
        if vectors.len() != chunks.len() {
            return Err(RagError::Embedding(anyhow!(
                "expected {} embeddings, received {}",
                chunks.len(),
                vectors.len()
            )));
        }

        let metadatas: Vec<ChunkMetadata> = chunks.into_iter().map(ChunkMetadata::from).collect();
        let count = metadatas.len();
        let store = Arc::clone(&self.store);
        let ids = tokio::task::spawn_blocking(move || store.commit(&vectors, metadatas))
            .await
            .map_err(|e| RagError::Io(std::io::Error::other(e)))??;

        let total_vectors = usize::try_from(ids.end).unwrap_or(usize::MAX);
        tracing::info!(
            file = %filename,
            chunks = count,
            first_id = ids.start,
            total_vectors,
            "ingestion complete"
        );
        Ok(IngestOutcome {
            source_file: filename.to_owned(),
            chunks: count,
            total_vectors,
        })
    }

    /// Ingests one document; every outcome, including failure, is only logged.
    pub async fn ingest(&self, path: impl AsRef<Path>, filename: &str) {
        if let Err(err) = self.try_ingest(path, filename).await {
            tracing::error!(file = %filename, error = %err, "ingestion failed");
        }
    }

    /// Runs [`ingest`](Self::ingest) in the background on the current tokio runtime.
    ///
    /// The handle lets a caller wait for completion; dropping it does not cancel the work.
    pub fn spawn(&self, path: impl Into<PathBuf>, filename: impl Into<String>) -> JoinHandle<()> {
        let this = self.clone();
        let path = path.into();
        let filename = filename.into();
        tokio::spawn(async move { this.ingest(&path, &filename).await })
    }

    /// Store this ingestor writes into.
    #[must_use]
    pub const fn store(&self) -> &Arc<VectorStore> {
        &self.store
    }
}

async fn extract(path: PathBuf, filename: &str) -> Result<String> {
    let extraction_error = |reason: String| RagError::Extraction {
        file: filename.to_owned(),
        reason,
    };
    let kind = DocumentKind::from_path(filename)
        .ok_or_else(|| extraction_error("unsupported document type".into()))?;

    tokio::task::spawn_blocking(move || extract_as(&path, kind))
        .await
        .map_err(|e| extraction_error(e.to_string()))?
        .map_err(|e| extraction_error(e.to_string()))
}
