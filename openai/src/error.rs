use std::fmt;

/// Errors that can arise when calling an OpenAI-compatible API.
#[derive(Debug)]
pub enum OpenAIError {
    /// Transport errors (connection, TLS, timeout).
    Http(reqwest::Error),
    /// The service answered with a non-success status.
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, kept for diagnostics.
        body: String,
    },
    /// JSON serialization/deserialization errors.
    Json(serde_json::Error),
    /// API contract violations (missing fields, count mismatches).
    Api(String),
}

impl fmt::Display for OpenAIError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(err) => write!(f, "HTTP error: {err}"),
            Self::Status { status, body } => write!(f, "HTTP status {status}: {body}"),
            Self::Json(err) => write!(f, "JSON error: {err}"),
            Self::Api(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for OpenAIError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Status { .. } | Self::Api(_) => None,
        }
    }
}

impl From<reqwest::Error> for OpenAIError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

impl From<serde_json::Error> for OpenAIError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
