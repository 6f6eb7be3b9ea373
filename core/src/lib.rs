//! # docqa-core
//!
//! Provider-neutral trait APIs shared by the rest of the workspace. The retrieval pipeline only
//! ever talks to these traits, so any embedding service or chat model can be plugged in by
//! implementing them.
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────────┐    ┌─────────────────┐
//! │   docqa-rag     │───▶│   docqa-core     │◀───│   Providers     │
//! │                 │    │   (this crate)   │    │                 │
//! │ - Ingestion     │    │ - EmbeddingModel │    │ - Jina          │
//! │ - Retrieval     │    │ - LanguageModel  │    │ - Groq          │
//! │ - Synthesis     │    │ - Message        │    │ - OpenAI        │
//! └─────────────────┘    └──────────────────┘    └─────────────────┘
//! ```
//!
//! | Capability | Trait | Description |
//! |------------|-------|-------------|
//! | **Embeddings** | [`EmbeddingModel`] | Convert a batch of texts to fixed-dimension vectors |
//! | **Language Models** | [`LanguageModel`] | Produce one completion for a list of role-tagged turns |
//!
//! ## Grounded completion
//!
//! ```rust
//! use docqa_core::{LanguageModel, llm::{oneshot, Parameters}};
//!
//! async fn answer(model: impl LanguageModel) -> docqa_core::Result {
//!     let request = oneshot("Answer only from the context.", "Context: ...\n\nQuestion: ...")
//!         .with_parameters(Parameters::default().temperature(0.0));
//!     model.respond(request).await
//! }
//! ```

/// Text embeddings.
pub mod embedding;
pub mod llm;

#[doc(inline)]
pub use embedding::{Embedding, EmbeddingModel};
#[doc(inline)]
pub use llm::LanguageModel;

/// Result type used throughout the crate.
///
/// Type alias for [`anyhow::Result<T>`](anyhow::Result) with [`String`] as default success type.
pub type Result<T = String> = anyhow::Result<T>;

pub use anyhow::Error;
