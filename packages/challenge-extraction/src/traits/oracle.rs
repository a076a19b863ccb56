//! Oracle trait for the LLM text-generation service.
//!
//! The oracle is opaque text-in/text-out: it receives a rendered prompt and a
//! credential and returns the reply text. Response envelopes, endpoints and
//! authentication details belong to implementations.

use async_trait::async_trait;

use crate::error::Result;
use crate::security::SecretString;

#[async_trait]
pub trait Oracle: Send + Sync {
    /// Send one prompt with one credential.
    ///
    /// Returns the reply text; an empty string when the service answered
    /// without any text. Any failure of this single attempt is an
    /// `ExtractionError::Oracle`.
    async fn generate(&self, credential: &SecretString, prompt: &str) -> Result<String>;

    /// Name for log lines.
    fn name(&self) -> &str {
        "oracle"
    }
}
