use crate::{
    DEFAULT_BASE_URL, DEFAULT_EMBEDDING_DIM, DEFAULT_EMBEDDING_MODEL, DEFAULT_MODEL,
    DEFAULT_TIMEOUT, GROQ_BASE_URL, JINA_BASE_URL, JINA_EMBEDDINGS_V3, LLAMA_3_3_70B_VERSATILE,
    error::OpenAIError, request::ChatCompletionRequest, response::ChatCompletionResponse,
};
use docqa_core::{LanguageModel, llm::LLMRequest};
use reqwest::header;
use serde::{Serialize, de::DeserializeOwned};
use std::{future::Future, sync::Arc, time::Duration};

/// Client for an OpenAI-compatible REST API.
///
/// One value carries both the chat model and the embedding model, so the same type serves as the
/// [`LanguageModel`] and the [`EmbeddingModel`](docqa_core::EmbeddingModel). Clones share the
/// underlying connection pool.
#[derive(Clone, Debug)]
pub struct OpenAI {
    inner: Arc<Config>,
}

impl OpenAI {
    /// Create a new client using the provided API key and default models.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::builder(api_key).build()
    }

    /// Create an embedding client for [`Jina AI`](https://jina.ai/embeddings).
    pub fn jina(api_key: impl Into<String>) -> Self {
        Self::builder(api_key)
            .base_url(JINA_BASE_URL)
            .embedding_model(JINA_EMBEDDINGS_V3)
            .build()
    }

    /// Create a chat client for [`Groq`](https://console.groq.com/docs/openai)'s OpenAI-compatible
    /// endpoint.
    pub fn groq(api_key: impl Into<String>) -> Self {
        Self::builder(api_key)
            .base_url(GROQ_BASE_URL)
            .model(LLAMA_3_3_70B_VERSATILE)
            .build()
    }

    /// Builder for clients pointed at other hosts or models.
    #[must_use]
    pub fn builder(api_key: impl Into<String>) -> Builder {
        Builder::new(api_key)
    }

    /// Model used for answer generation.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.inner).chat_model = sanitize_model(model);
        self
    }

    /// Host serving `/embeddings` and `/chat/completions`.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.inner).base_url = base_url.into();
        self
    }

    /// Embedding model; the vector dimension follows it when the model is known.
    #[must_use]
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        let model = sanitize_model(model);
        let cfg = Arc::make_mut(&mut self.inner);
        cfg.embedding_model = model;
        if let Some(dim) = infer_embedding_dim(&cfg.embedding_model) {
            cfg.embedding_dimensions = dim;
        }
        self
    }

    /// Vector dimension for embedding models this crate does not know.
    #[must_use]
    pub fn with_embedding_dimensions(mut self, dimensions: usize) -> Self {
        Arc::make_mut(&mut self.inner).embedding_dimensions = dimensions;
        self
    }

    pub(crate) fn config(&self) -> Arc<Config> {
        self.inner.clone()
    }
}

impl LanguageModel for OpenAI {
    fn model_id(&self) -> &str {
        &self.inner.chat_model
    }

    fn respond(&self, request: LLMRequest) -> impl Future<Output = docqa_core::Result> + Send {
        let cfg = self.config();
        async move {
            let (messages, parameters) = request.into_parts();
            let payload = ChatCompletionRequest::new(&cfg.chat_model, &messages, &parameters);
            let response: ChatCompletionResponse =
                cfg.post_json("/chat/completions", &payload).await?;
            let text = response
                .into_text()
                .ok_or_else(|| OpenAIError::Api("chat completion returned no content".into()))?;
            Ok(text)
        }
    }
}

/// Builder for [`OpenAI`].
#[derive(Debug)]
pub struct Builder {
    api_key: String,
    base_url: String,
    chat_model: String,
    embedding_model: String,
    embedding_dimensions: usize,
    organization: Option<String>,
    request_timeout: Duration,
}

impl Builder {
    fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_model: DEFAULT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dimensions: DEFAULT_EMBEDDING_DIM,
            organization: None,
            request_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the REST base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Select the chat model identifier.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = sanitize_model(model);
        self
    }

    /// Select the embedding model identifier; the dimension follows known models.
    #[must_use]
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = sanitize_model(model);
        if let Some(dim) = infer_embedding_dim(&self.embedding_model) {
            self.embedding_dimensions = dim;
        }
        self
    }

    /// Override the embedding dimension.
    #[must_use]
    pub const fn embedding_dimensions(mut self, dimensions: usize) -> Self {
        self.embedding_dimensions = dimensions;
        self
    }

    /// Sends an `OpenAI-Organization` header.
    #[must_use]
    pub fn organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// Per-request timeout (default 60 seconds).
    ///
    /// The timeout applies to the entire request, including connection and body download. A
    /// timed-out call surfaces as [`OpenAIError::Http`] and is not retried.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Finishes the client.
    #[must_use]
    pub fn build(self) -> OpenAI {
        let http = reqwest::Client::builder()
            .timeout(self.request_timeout)
            .user_agent(concat!("docqa-openai/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "falling back to default HTTP client");
                reqwest::Client::new()
            });
        OpenAI {
            inner: Arc::new(Config {
                api_key: self.api_key,
                base_url: self.base_url,
                chat_model: self.chat_model,
                embedding_model: self.embedding_model,
                embedding_dimensions: self.embedding_dimensions,
                organization: self.organization,
                http,
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) api_key: String,
    pub(crate) base_url: String,
    pub(crate) chat_model: String,
    pub(crate) embedding_model: String,
    pub(crate) embedding_dimensions: usize,
    pub(crate) organization: Option<String>,
    pub(crate) http: reqwest::Client,
}

impl Config {
    pub(crate) fn request_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub(crate) fn request_auth(&self) -> String {
        format!("Bearer {}", self.api_key)
    }

    /// POSTs a JSON body and decodes a JSON response, mapping non-2xx statuses to
    /// [`OpenAIError::Status`].
    pub(crate) async fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, OpenAIError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let mut builder = self
            .http
            .post(self.request_url(path))
            .header(header::AUTHORIZATION, self.request_auth())
            .json(body);
        if let Some(org) = &self.organization {
            builder = builder.header("OpenAI-Organization", org.as_str());
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            return Err(OpenAIError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn sanitize_model(model: impl Into<String>) -> String {
    model.into().trim().to_string()
}

fn infer_embedding_dim(model: &str) -> Option<usize> {
    match model {
        "text-embedding-3-large" => Some(3072),
        "text-embedding-3-small" | "text-embedding-ada-002" => Some(1536),
        "jina-embeddings-v3" => Some(1024),
        "jina-embeddings-v2-base-en" => Some(768),
        _ => None,
    }
}
