//! High-level RAG orchestrator.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use docqa_core::{EmbeddingModel, LanguageModel};
use tokio::task::JoinHandle;

use crate::chunking::FixedSizeChunker;
use crate::config::{RagConfig, RagConfigBuilder};
use crate::error::Result;
use crate::ingestion::{IngestOutcome, Ingestor};
use crate::persistence::IndexFiles;
use crate::retrieval::Retriever;
use crate::store::VectorStore;
use crate::synthesis::{NO_MATCHES, Synthesizer};
use crate::types::{QueryResponse, SearchResult, Source};

/// Ties ingestion, retrieval and synthesis to one shared [`VectorStore`].
///
/// `E` embeds both chunks and questions; `L` writes answers.
pub struct Rag<E, L> {
    config: RagConfig,
    store: Arc<VectorStore>,
    ingestor: Ingestor<E>,
    retriever: Retriever<E>,
    synthesizer: Synthesizer<L>,
}

impl<E, L> std::fmt::Debug for Rag<E, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rag")
            .field("config", &self.config)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl<E, L> Rag<E, L>
where
    E: EmbeddingModel + 'static,
    L: LanguageModel,
{
    /// Creates a builder for custom configuration.
    pub fn builder(embedder: E, model: L) -> RagBuilder<E, L> {
        RagBuilder::new(embedder, model)
    }

    /// Starts ingesting a document in the background.
    ///
    /// Outcomes are only logged; the handle can be awaited to know when the work is done.
    pub fn ingest(&self, path: impl Into<PathBuf>, filename: impl Into<String>) -> JoinHandle<()> {
        self.ingestor.spawn(path, filename)
    }

    /// Ingests a document in the current task and reports the outcome.
    ///
    /// # Errors
    /// See [`Ingestor::try_ingest`].
    pub async fn try_ingest(&self, path: impl AsRef<Path>, filename: &str) -> Result<IngestOutcome> {
        self.ingestor.try_ingest(path, filename).await
    }

    /// Returns up to `top_k` chunks nearest to `question`; empty on any failure.
    pub async fn retrieve(&self, question: &str, top_k: usize) -> Vec<SearchResult> {
        self.retriever.retrieve(question, top_k).await
    }

    /// Writes an answer grounded in `retrieved`; never fails.
    pub async fn synthesize(&self, question: &str, retrieved: &[SearchResult]) -> String {
        self.synthesizer.synthesize(question, retrieved).await
    }

    /// Answers a question using the configured default `top_k`.
    pub async fn query(&self, question: &str) -> QueryResponse {
        self.query_with_k(question, self.config.default_top_k).await
    }

    /// Retrieves, then synthesizes.
    ///
    /// When nothing is retrieved the model is not called and the answer is [`NO_MATCHES`].
    pub async fn query_with_k(&self, question: &str, top_k: usize) -> QueryResponse {
        let retrieved = self.retrieve(question, top_k).await;
        if retrieved.is_empty() {
            tracing::info!("no relevant matches; skipping generation");
            return QueryResponse {
                answer: NO_MATCHES.to_owned(),
                sources: Vec::new(),
            };
        }

        let answer = self.synthesize(question, &retrieved).await;
        let sources = retrieved
            .iter()
            .map(|result| Source::from(&result.metadata))
            .collect();
        QueryResponse { answer, sources }
    }

    /// The shared vector store.
    #[must_use]
    pub const fn store(&self) -> &Arc<VectorStore> {
        &self.store
    }

    /// Number of indexed chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if nothing has been ingested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Returns configuration.
    pub const fn config(&self) -> &RagConfig {
        &self.config
    }
}

/// Builder for configuring a [`Rag`] instance.
pub struct RagBuilder<E, L> {
    embedder: E,
    model: L,
    config_builder: RagConfigBuilder,
    load_existing: bool,
}

impl<E, L> std::fmt::Debug for RagBuilder<E, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagBuilder")
            .field("config_builder", &self.config_builder)
            .field("load_existing", &self.load_existing)
            .finish_non_exhaustive()
    }
}

impl<E, L> RagBuilder<E, L>
where
    E: EmbeddingModel + 'static,
    L: LanguageModel,
{
    fn new(embedder: E, model: L) -> Self {
        Self {
            embedder,
            model,
            config_builder: RagConfigBuilder::new(),
            load_existing: true,
        }
    }

    /// Replaces the whole configuration.
    #[must_use]
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config_builder = RagConfigBuilder::new()
            .data_dir(&config.data_dir)
            .chunk_size(config.chunk_size)
            .chunk_overlap(config.chunk_overlap)
            .default_top_k(config.default_top_k);
        self
    }

    /// Sets the data directory.
    #[must_use]
    pub fn data_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.config_builder = self.config_builder.data_dir(path);
        self
    }

    /// Sets the chunk window and overlap in characters.
    #[must_use]
    pub fn chunking(mut self, chunk_size: usize, overlap: usize) -> Self {
        self.config_builder = self
            .config_builder
            .chunk_size(chunk_size)
            .chunk_overlap(overlap);
        self
    }

    /// Sets the default number of search results.
    #[must_use]
    pub fn top_k(mut self, k: usize) -> Self {
        self.config_builder = self.config_builder.default_top_k(k);
        self
    }

    /// Whether to load a persisted index on build (default `true`).
    #[must_use]
    pub const fn load_existing(mut self, load: bool) -> Self {
        self.load_existing = load;
        self
    }

    /// Builds the [`Rag`] instance, loading any persisted index.
    ///
    /// Loading reads from disk; call this from a blocking context in async code.
    ///
    /// # Errors
    /// Returns [`RagError::InvalidConfig`](crate::RagError::InvalidConfig) if the chunking
    /// parameters cannot make progress.
    pub fn build(self) -> Result<Rag<E, L>> {
        let config = self.config_builder.build();
        let chunker = FixedSizeChunker::new(config.chunk_size, config.chunk_overlap)?;

        let files = IndexFiles::from_config(&config);
        let store = Arc::new(if self.load_existing {
            VectorStore::open(files)
        } else {
            VectorStore::new(files)
        });

        let embedder = Arc::new(self.embedder);
        let ingestor = Ingestor::new(Arc::clone(&embedder), Arc::clone(&store), Arc::new(chunker));
        let retriever = Retriever::new(embedder, Arc::clone(&store));

        Ok(Rag {
            config,
            store,
            ingestor,
            retriever,
            synthesizer: Synthesizer::new(self.model),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RagError;
    use crate::synthesis::APOLOGY;
    use docqa_core::Embedding;
    use docqa_core::llm::LLMRequest;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    struct MockEmbedder;

    impl EmbeddingModel for MockEmbedder {
        fn dim(&self) -> usize {
            3
        }

        async fn embed_batch(&self, texts: &[String]) -> docqa_core::Result<Vec<Embedding>> {
            Ok(texts
                .iter()
                .map(|t| vec![t.len() as f32, t.matches('a').count() as f32, 1.0])
                .collect())
        }
    }

    struct MockModel {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl LanguageModel for MockModel {
        fn model_id(&self) -> &str {
            "mock"
        }

        async fn respond(&self, request: LLMRequest) -> docqa_core::Result {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("service unavailable");
            }
            Ok(format!("answered {} turns", request.messages().len()))
        }
    }

    fn model(fail: bool) -> (MockModel, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            MockModel {
                calls: Arc::clone(&calls),
                fail,
            },
            calls,
        )
    }

    #[tokio::test]
    async fn query_returns_answer_and_sources() {
        let dir = tempdir().unwrap();
        let (model, calls) = model(false);
        let rag = Rag::builder(MockEmbedder, model)
            .data_dir(dir.path())
            .chunking(20, 5)
            .build()
            .unwrap();

        let doc = dir.path().join("doc.txt");
        std::fs::write(&doc, "a banana and an apple are fruit salad").unwrap();
        rag.ingest(&doc, "doc.txt").await.unwrap();
        assert_eq!(rag.len(), 3);

        let response = rag.query_with_k("fruit", 2).await;
        assert_eq!(response.answer, "answered 2 turns");
        assert_eq!(response.sources.len(), 2);
        assert!(response.sources.iter().all(|s| s.source_file == "doc.txt"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_index_skips_generation() {
        let dir = tempdir().unwrap();
        let (model, calls) = model(false);
        let rag = Rag::builder(MockEmbedder, model)
            .data_dir(dir.path())
            .build()
            .unwrap();

        let response = rag.query("anything").await;
        assert_eq!(response.answer, NO_MATCHES);
        assert!(response.sources.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn generation_failure_keeps_sources() {
        let dir = tempdir().unwrap();
        let (model, _) = model(true);
        let rag = Rag::builder(MockEmbedder, model)
            .data_dir(dir.path())
            .build()
            .unwrap();

        let doc = dir.path().join("doc.txt");
        std::fs::write(&doc, "short").unwrap();
        rag.try_ingest(&doc, "doc.txt").await.unwrap();

        let response = rag.query("q").await;
        assert_eq!(response.answer, APOLOGY);
        assert_eq!(response.sources.len(), 1);
    }

    #[tokio::test]
    async fn build_loads_persisted_index() {
        let dir = tempdir().unwrap();
        let doc = dir.path().join("doc.txt");
        std::fs::write(&doc, "persist me").unwrap();

        {
            let rag = Rag::builder(MockEmbedder, model(false).0)
                .data_dir(dir.path())
                .build()
                .unwrap();
            rag.try_ingest(&doc, "doc.txt").await.unwrap();
        }

        let rag = Rag::builder(MockEmbedder, model(false).0)
            .data_dir(dir.path())
            .build()
            .unwrap();
        assert_eq!(rag.len(), 1);

        let fresh = Rag::builder(MockEmbedder, model(false).0)
            .data_dir(dir.path())
            .load_existing(false)
            .build()
            .unwrap();
        assert!(fresh.is_empty());
    }

    #[test]
    fn invalid_chunking_fails_fast() {
        let result = Rag::builder(MockEmbedder, model(false).0)
            .chunking(100, 100)
            .load_existing(false)
            .build();
        assert!(matches!(result, Err(RagError::InvalidConfig(_))));
    }

    #[test]
    fn builder_configuration() {
        let dir = tempdir().unwrap();
        let config = RagConfig::builder()
            .data_dir(dir.path())
            .chunk_size(400)
            .chunk_overlap(40)
            .default_top_k(8)
            .build();
        let rag = Rag::builder(MockEmbedder, model(false).0)
            .config(config.clone())
            .build()
            .unwrap();
        assert_eq!(rag.config(), &config);
        assert_eq!(
            rag.store().files().vectors_path(),
            dir.path().join("index/vectors.rkyv")
        );
    }
}
