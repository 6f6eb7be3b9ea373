//! Message types for AI language model conversations.
//!
//! Messages are represented as an enum with one variant per role. A grounded question-answering
//! call only needs a system instruction and a user turn, but assistant turns are kept so that a
//! conversation can be replayed to the provider verbatim.

use serde::{Deserialize, Serialize};

/// Conversation participant role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The person asking a question.
    User,
    /// A previous model reply.
    Assistant,
    /// Grounding and formatting instructions.
    System,
}

impl Role {
    /// Returns the wire name used by chat-completion style APIs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

/// One role-tagged turn sent to a language model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    /// User message.
    User {
        /// Text content of the message.
        content: String,
    },
    /// Assistant message.
    Assistant {
        /// Text content of the message.
        content: String,
    },
    /// System message with instructions/context.
    System {
        /// Text content of the message.
        content: String,
    },
}

impl Message {
    /// Who wrote the turn.
    #[must_use]
    pub const fn role(&self) -> Role {
        match self {
            Self::User { .. } => Role::User,
            Self::Assistant { .. } => Role::Assistant,
            Self::System { .. } => Role::System,
        }
    }

    /// Text of the turn.
    #[must_use]
    pub fn content(&self) -> &str {
        match self {
            Self::User { content } | Self::Assistant { content } | Self::System { content } => {
                content
            }
        }
    }

    /// A question turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    /// A model reply turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: content.into(),
        }
    }

    /// An instruction turn.
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }
}
