//! Error types for the Gemini client.

use thiserror::Error;

/// Result type for Gemini client operations.
pub type Result<T> = std::result::Result<T, GeminiError>;

/// Gemini client errors.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// Transport failure (connection refused, DNS, timeout)
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// Non-2xx response from the API
    #[error("Error {status}: {body}")]
    Api { status: u16, body: String },

    /// Response body was not the expected envelope
    #[error("Parse error: {0}")]
    Parse(String),
}

impl GeminiError {
    /// Wrap a transport error with the request URL stripped.
    pub fn transport(err: reqwest::Error) -> Self {
        Self::Http(err.without_url())
    }

    /// True when the request ran out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }

    /// HTTP status code, when the API answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Parse(_) => None,
        }
    }
}
