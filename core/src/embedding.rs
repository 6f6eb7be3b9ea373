//! # Embedding Module
//!
//! Embeddings are dense vector representations of text. Texts with similar meaning produce
//! vectors that are close to each other, which is what makes nearest-neighbour retrieval over a
//! document corpus work.
//!
//! The [`EmbeddingModel`] trait is batch-first: a document is split into many chunks and all of
//! them are sent to the embedding service in one request. A single-text helper,
//! [`EmbeddingModel::embed`], is provided on top of the batch call for queries.
//!
//! ```rust
//! use docqa_core::EmbeddingModel;
//!
//! async fn example<T: EmbeddingModel>(model: &T) -> docqa_core::Result<()> {
//!     let texts = vec!["first chunk".to_string(), "second chunk".to_string()];
//!     let vectors = model.embed_batch(&texts).await?;
//!     assert_eq!(vectors.len(), texts.len());
//!     Ok(())
//! }
//! ```

use anyhow::anyhow;
use std::future::Future;
use std::sync::Arc;

/// A type alias for an embedding vector of 32-bit floats.
pub type Embedding = Vec<f32>;

/// Converts text to vector representations.
///
/// # Implementation Requirements
///
/// - [`embed_batch`](EmbeddingModel::embed_batch) returns exactly one vector per input, in input
///   order, all with the same length.
/// - An empty input slice yields an empty output without contacting any service.
/// - Implementations do not retry; a failure is final for that call and the caller decides what to
///   do with it.
pub trait EmbeddingModel: Send + Sync {
    /// Returns the embedding vector dimension the model is configured for.
    fn dim(&self) -> usize;

    /// Converts a batch of texts to embedding vectors, one per input, in the same order.
    fn embed_batch(
        &self,
        texts: &[String],
    ) -> impl Future<Output = crate::Result<Vec<Embedding>>> + Send;

    /// Converts a single text to an embedding vector.
    fn embed(&self, text: &str) -> impl Future<Output = crate::Result<Embedding>> + Send {
        let input = [text.to_owned()];
        async move {
            self.embed_batch(&input)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| anyhow!("embedding service returned no vector"))
        }
    }
}

impl<T: EmbeddingModel> EmbeddingModel for Arc<T> {
    fn dim(&self) -> usize {
        T::dim(self)
    }

    fn embed_batch(
        &self,
        texts: &[String],
    ) -> impl Future<Output = crate::Result<Vec<Embedding>>> + Send {
        T::embed_batch(self, texts)
    }
}

impl<T: EmbeddingModel> EmbeddingModel for &T {
    fn dim(&self) -> usize {
        T::dim(self)
    }

    fn embed_batch(
        &self,
        texts: &[String],
    ) -> impl Future<Output = crate::Result<Vec<Embedding>>> + Send {
        T::embed_batch(self, texts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockEmbeddingModel {
        dimension: usize,
    }

    impl EmbeddingModel for MockEmbeddingModel {
        fn dim(&self) -> usize {
            self.dimension
        }

        #[allow(clippy::cast_precision_loss)]
        async fn embed_batch(&self, texts: &[String]) -> crate::Result<Vec<Embedding>> {
            Ok(texts
                .iter()
                .map(|text| {
                    (0..self.dimension)
                        .map(|i| (text.len() + i) as f32 * 0.01)
                        .collect()
                })
                .collect())
        }
    }

    struct SilentModel;

    impl EmbeddingModel for SilentModel {
        fn dim(&self) -> usize {
            3
        }

        async fn embed_batch(&self, _texts: &[String]) -> crate::Result<Vec<Embedding>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn batch_preserves_order_and_count() {
        let model = MockEmbeddingModel { dimension: 2 };
        let texts = vec!["a".to_string(), "abc".to_string()];
        let vectors = model.embed_batch(&texts).await.unwrap();

        assert_eq!(vectors.len(), 2);
        assert!((vectors[0][0] - 0.01).abs() < f32::EPSILON);
        assert!((vectors[1][0] - 0.03).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn single_embed_uses_batch() {
        let model = MockEmbeddingModel { dimension: 4 };
        let embedding = model.embed("test").await.unwrap();

        assert_eq!(embedding.len(), 4);
        assert!((embedding[3] - 0.07).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn single_embed_fails_on_empty_response() {
        let result = SilentModel.embed("anything").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn arc_forwards_to_inner_model() {
        let model = Arc::new(MockEmbeddingModel { dimension: 3 });
        assert_eq!(model.dim(), 3);
        let vectors = model.embed_batch(&["x".to_string()]).await.unwrap();
        assert_eq!(vectors[0].len(), 3);
    }
}
