use crate::{
    client::{Config, OpenAI},
    error::OpenAIError,
    response::EmbeddingResponse,
};
use docqa_core::{Embedding, EmbeddingModel, Result as CoreResult};
use serde::Serialize;
use std::sync::Arc;

impl EmbeddingModel for OpenAI {
    fn dim(&self) -> usize {
        self.config().embedding_dimensions
    }

    fn embed_batch(
        &self,
        texts: &[String],
    ) -> impl core::future::Future<Output = CoreResult<Vec<Embedding>>> + Send {
        let cfg = self.config();
        let input = texts.to_vec();
        async move {
            if input.is_empty() {
                return Ok(Vec::new());
            }
            let vectors = embed_many(cfg, input).await?;
            Ok(vectors)
        }
    }
}

async fn embed_many(cfg: Arc<Config>, input: Vec<String>) -> Result<Vec<Embedding>, OpenAIError> {
    let request = EmbeddingRequest {
        model: &cfg.embedding_model,
        input: &input,
    };
    let response: EmbeddingResponse = cfg.post_json("/embeddings", &request).await?;
    let vectors = order_by_index(response, input.len())?;
    tracing::debug!(
        model = %cfg.embedding_model,
        count = vectors.len(),
        "embedding batch complete"
    );
    Ok(vectors)
}

/// Restores input order from the `index` field and checks one vector per input.
fn order_by_index(response: EmbeddingResponse, expected: usize) -> Result<Vec<Embedding>, OpenAIError> {
    if response.data.len() != expected {
        return Err(OpenAIError::Api(format!(
            "embedding response has {} vectors for {expected} inputs",
            response.data.len()
        )));
    }
    let mut items = response.data;
    if items.iter().all(|item| item.index.is_some()) {
        items.sort_by_key(|item| item.index);
    }
    let vectors: Vec<Embedding> = items.into_iter().map(|item| item.embedding).collect();
    if let Some(first) = vectors.first() {
        if vectors.iter().any(|v| v.len() != first.len()) {
            return Err(OpenAIError::Api(
                "embedding response mixes vector dimensions".into(),
            ));
        }
    }
    Ok(vectors)
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> EmbeddingResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn restores_input_order() {
        let response = parse(
            r#"{"data":[{"index":1,"embedding":[2.0]},{"index":0,"embedding":[1.0]}]}"#,
        );
        let vectors = order_by_index(response, 2).unwrap();
        assert_eq!(vectors, vec![vec![1.0], vec![2.0]]);
    }

    #[test]
    fn count_mismatch_is_rejected() {
        let response = parse(r#"{"data":[{"embedding":[1.0]}]}"#);
        assert!(matches!(order_by_index(response, 2), Err(OpenAIError::Api(_))));
    }

    #[test]
    fn mixed_dimensions_are_rejected() {
        let response = parse(r#"{"data":[{"embedding":[1.0]},{"embedding":[1.0,2.0]}]}"#);
        assert!(order_by_index(response, 2).is_err());
    }

    #[test]
    fn request_body_shape() {
        let input = vec!["a".to_string(), "b".to_string()];
        let body = serde_json::to_value(EmbeddingRequest {
            model: "jina-embeddings-v3",
            input: &input,
        })
        .unwrap();
        assert_eq!(body["model"], "jina-embeddings-v3");
        assert_eq!(body["input"][1], "b");
    }

    #[tokio::test]
    async fn empty_batch_skips_network() {
        let client = OpenAI::builder("k").base_url("http://127.0.0.1:9").build();
        let vectors = client.embed_batch(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }
}
