//! Query-time retrieval: embed the question, search the index.

use std::sync::Arc;

use docqa_core::EmbeddingModel;

use crate::store::VectorStore;
use crate::types::SearchResult;

/// Finds the chunks nearest to a question.
///
/// Retrieval never fails: an unavailable embedding service or a query the index cannot serve
/// degrades to an empty result, which the caller treats as "no context found". No relevance
/// threshold is applied.
pub struct Retriever<E> {
    embedder: Arc<E>,
    store: Arc<VectorStore>,
}

impl<E> Clone for Retriever<E> {
    fn clone(&self) -> Self {
        Self {
            embedder: Arc::clone(&self.embedder),
            store: Arc::clone(&self.store),
        }
    }
}

impl<E> std::fmt::Debug for Retriever<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl<E: EmbeddingModel> Retriever<E> {
    /// Creates a retriever over `store`.
    pub const fn new(embedder: Arc<E>, store: Arc<VectorStore>) -> Self {
        Self { embedder, store }
    }

    /// Returns up to `top_k` matches ordered by ascending distance.
    pub async fn retrieve(&self, question: &str, top_k: usize) -> Vec<SearchResult> {
        let input = [question.to_owned()];
        let query = match self.embedder.embed_batch(&input).await {
            Ok(vectors) => match vectors.into_iter().next() {
                Some(vector) => vector,
                None => {
                    tracing::warn!("embedding service returned no vector for the question");
                    return Vec::new();
                }
            },
            Err(err) => {
                tracing::error!(error = %err, "failed to embed question");
                return Vec::new();
            }
        };

        match self.store.search(&query, top_k) {
            Ok(results) => {
                tracing::info!(top_k, matches = results.len(), "retrieval complete");
                results
            }
            Err(err) => {
                tracing::error!(error = %err, "index search failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::IndexFiles;
    use crate::types::ChunkMetadata;
    use docqa_core::Embedding;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    /// Embeds every text as a fixed vector.
    struct FixedEmbedder {
        vector: Option<Embedding>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl FixedEmbedder {
        fn returning(vector: Option<Embedding>) -> Self {
            Self {
                vector,
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl EmbeddingModel for FixedEmbedder {
        fn dim(&self) -> usize {
            self.vector.as_ref().map_or(0, Vec::len)
        }

        async fn embed_batch(&self, texts: &[String]) -> docqa_core::Result<Vec<Embedding>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(texts.len(), 1);
            if self.fail {
                anyhow::bail!("timed out");
            }
            Ok(self.vector.clone().into_iter().collect())
        }
    }

    fn populated_store(dir: &std::path::Path) -> Arc<VectorStore> {
        let store = VectorStore::new(IndexFiles::new(dir.join("v.rkyv"), dir.join("m.json")));
        let vectors: Vec<Vec<f32>> = (0..10).map(|i| vec![i as f32, 0.0]).collect();
        let metas = (0..10)
            .map(|i| ChunkMetadata {
                text: format!("text {i}"),
                source_file: "doc.txt".into(),
                chunk_id: format!("doc.txt_chunk_{i}"),
            })
            .collect();
        store.add(&vectors, metas).unwrap();
        Arc::new(store)
    }

    #[tokio::test]
    async fn returns_nearest_first() {
        let dir = tempdir().unwrap();
        let embedder = Arc::new(FixedEmbedder::returning(Some(vec![6.2, 0.0])));
        let retriever = Retriever::new(Arc::clone(&embedder), populated_store(dir.path()));

        let results = retriever.retrieve("question", 3).await;
        let ids: Vec<&str> = results.iter().map(|r| r.metadata.chunk_id.as_str()).collect();
        assert_eq!(ids, ["doc.txt_chunk_6", "doc.txt_chunk_7", "doc.txt_chunk_5"]);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn no_threshold_is_applied() {
        let dir = tempdir().unwrap();
        let embedder = Arc::new(FixedEmbedder::returning(Some(vec![1000.0, 1000.0])));
        let retriever = Retriever::new(embedder, populated_store(dir.path()));
        assert_eq!(retriever.retrieve("far away", 5).await.len(), 5);
    }

    #[tokio::test]
    async fn embedding_failure_yields_nothing() {
        let dir = tempdir().unwrap();
        let mut embedder = FixedEmbedder::returning(Some(vec![0.0, 0.0]));
        embedder.fail = true;
        let retriever = Retriever::new(Arc::new(embedder), populated_store(dir.path()));
        assert!(retriever.retrieve("question", 5).await.is_empty());
    }

    #[tokio::test]
    async fn missing_vector_yields_nothing() {
        let dir = tempdir().unwrap();
        let embedder = Arc::new(FixedEmbedder::returning(None));
        let retriever = Retriever::new(embedder, populated_store(dir.path()));
        assert!(retriever.retrieve("question", 5).await.is_empty());
    }

    #[tokio::test]
    async fn wrong_query_dimension_yields_nothing() {
        let dir = tempdir().unwrap();
        let embedder = Arc::new(FixedEmbedder::returning(Some(vec![0.0, 0.0, 0.0])));
        let retriever = Retriever::new(embedder, populated_store(dir.path()));
        assert!(retriever.retrieve("question", 5).await.is_empty());
    }
}
