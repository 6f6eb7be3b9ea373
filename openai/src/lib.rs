//! OpenAI-compatible provider for docqa.
//!
//! One client type speaks the `/embeddings` and `/chat/completions` endpoints shared by `OpenAI`,
//! [Jina AI](https://jina.ai/embeddings) and [Groq](https://console.groq.com/docs/openai). It
//! implements both [`docqa_core::EmbeddingModel`] and [`docqa_core::LanguageModel`].
//!
//! ```no_run
//! use docqa_core::{EmbeddingModel, LanguageModel, llm::oneshot};
//! use docqa_openai::OpenAI;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let embedder = OpenAI::jina(std::env::var("DOCQA_JINA_API_KEY")?);
//! let vector = embedder.embed("What is the refund policy?").await?;
//! assert_eq!(vector.len(), embedder.dim());
//!
//! let generator = OpenAI::groq(std::env::var("DOCQA_GROQ_API_KEY")?);
//! let answer = generator.respond(oneshot("Answer briefly.", "Hello")).await?;
//! println!("{answer}");
//! # Ok(()) }
//! ```

mod client;
mod embedding;
mod error;
mod request;
mod response;

pub use client::{Builder, OpenAI};
pub use error::OpenAIError;

mod constant;
pub use constant::*;

use std::time::Duration;

pub(crate) const DEFAULT_MODEL: &str = GPT4O_MINI;
pub(crate) const DEFAULT_BASE_URL: &str = OPENAI_BASE_URL;
pub(crate) const DEFAULT_EMBEDDING_MODEL: &str = EMBEDDING_SMALL;
pub(crate) const DEFAULT_EMBEDDING_DIM: usize = 1536;
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
