//! # Language Models
//!
//! Provider-agnostic request/response types for text generation.
//!
//! - **[`LanguageModel`]** - produces one completion for a request
//! - **[`LLMRequest`]** - ordered role-tagged turns plus sampling [`Parameters`]
//! - **[`Message`]** - an individual turn
//!
//! ```rust
//! use docqa_core::llm::{LLMRequest, Message, Parameters};
//!
//! let request = LLMRequest::new([
//!     Message::system("You are a helpful assistant"),
//!     Message::user("What's the capital of Japan?"),
//! ])
//! .with_parameters(Parameters::default().temperature(0.0));
//!
//! assert_eq!(request.messages().len(), 2);
//! ```

/// Message types and conversation handling.
pub mod message;

use std::future::Future;

pub use message::{Message, Role};

/// Sampling parameters forwarded to the provider.
///
/// Unset fields are omitted from the wire request so the provider default applies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    /// Sampling temperature. `0.0` selects deterministic decoding.
    pub temperature: Option<f32>,
    /// Upper bound on generated tokens.
    pub max_tokens: Option<u32>,
    /// Nucleus sampling cutoff.
    pub top_p: Option<f32>,
}

impl Parameters {
    /// Sets the sampling temperature.
    #[must_use]
    pub const fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the maximum number of generated tokens.
    #[must_use]
    pub const fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the nucleus sampling cutoff.
    #[must_use]
    pub const fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }
}

/// Builder-style request passed into [`LanguageModel::respond`].
#[derive(Debug, Clone, PartialEq)]
pub struct LLMRequest {
    messages: Vec<Message>,
    parameters: Parameters,
}

impl LLMRequest {
    /// Creates a request from the provided messages using default parameters.
    pub fn new(messages: impl Into<Vec<Message>>) -> Self {
        Self {
            messages: messages.into(),
            parameters: Parameters::default(),
        }
    }

    /// Overrides the sampling parameters used for this call.
    #[must_use]
    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Returns the current conversation messages.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the current parameter snapshot.
    #[must_use]
    pub const fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Breaks the request into owned components for providers that want to take ownership.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Message>, Parameters) {
        (self.messages, self.parameters)
    }
}

/// Language models for text generation.
///
/// Implementations perform exactly one call per [`respond`](LanguageModel::respond); retries and
/// fallbacks are the caller's business.
pub trait LanguageModel: Send + Sync {
    /// Identifier of the model requests are sent to.
    fn model_id(&self) -> &str;

    /// Generates one completion for the conversation.
    fn respond(&self, request: LLMRequest) -> impl Future<Output = crate::Result<String>> + Send;
}

impl<T: LanguageModel> LanguageModel for std::sync::Arc<T> {
    fn model_id(&self) -> &str {
        T::model_id(self)
    }

    fn respond(&self, request: LLMRequest) -> impl Future<Output = crate::Result<String>> + Send {
        T::respond(self, request)
    }
}

/// Builds a two-turn request from a system instruction and a user turn.
pub fn oneshot(system: impl Into<String>, user: impl Into<String>) -> LLMRequest {
    LLMRequest::new(vec![Message::system(system), Message::user(user)])
}
