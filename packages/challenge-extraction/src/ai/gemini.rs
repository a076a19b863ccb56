//! Gemini implementation of the Oracle trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use challenge_extraction::ai::GeminiOracle;
//!
//! let oracle = GeminiOracle::new().with_model("gemini-2.0-flash");
//! let reply = oracle.generate(&key, &prompt).await?;
//! ```

use async_trait::async_trait;
use gemini_client::GeminiClient;
use std::time::Duration;
use tracing::warn;

use crate::error::{ExtractionError, Result};
use crate::security::SecretString;
use crate::traits::oracle::Oracle;

/// Gemini-backed oracle.
///
/// The credential is supplied per call, so one oracle serves a whole
/// credential pool.
#[derive(Clone, Default)]
pub struct GeminiOracle {
    client: GeminiClient,
}

impl GeminiOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing client.
    pub fn with_client(client: GeminiClient) -> Self {
        Self { client }
    }

    /// Set the model (default: gemini-2.0-flash).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.client = self.client.with_model(model);
        self
    }

    /// Set a custom base URL (proxies, test servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.client = self.client.with_base_url(url);
        self
    }

    /// Bound each call.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = self
            .client
            .with_timeout(timeout)
            .map_err(|e| ExtractionError::Config(format!("failed to create Gemini client: {}", e)))?;
        Ok(self)
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }
}

#[async_trait]
impl Oracle for GeminiOracle {
    async fn generate(&self, credential: &SecretString, prompt: &str) -> Result<String> {
        let text = self
            .client
            .generate_text(credential.expose(), prompt)
            .await
            .map_err(|e| ExtractionError::Oracle(Box::new(e)))?;

        Ok(text.unwrap_or_else(|| {
            warn!(model = %self.client.model(), "Reply had no candidate text, treating as empty");
            String::new()
        }))
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_generate_returns_first_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:generateContent"))
            .and(header("x-goog-api-key", "k1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "{\"number_of_birders\": 4}"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let oracle = GeminiOracle::new().with_base_url(server.uri());
        let reply = oracle
            .generate(&SecretString::new("k1"), "prompt")
            .await
            .unwrap();
        assert_eq!(reply, "{\"number_of_birders\": 4}");
    }

    #[tokio::test]
    async fn test_empty_envelope_is_empty_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let oracle = GeminiOracle::new().with_base_url(server.uri());
        let reply = oracle.generate(&SecretString::new("k"), "p").await.unwrap();
        assert_eq!(reply, "");
    }

    #[tokio::test]
    async fn test_api_error_is_oracle_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let oracle = GeminiOracle::new().with_base_url(server.uri());
        let err = oracle.generate(&SecretString::new("k"), "p").await.unwrap_err();

        assert!(matches!(err, ExtractionError::Oracle(_)));
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn test_stalled_call_times_out_as_oracle_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let oracle = GeminiOracle::new()
            .with_base_url(server.uri())
            .with_timeout(Duration::from_millis(200))
            .unwrap();
        let err = oracle
            .generate(&SecretString::new("AIzaSecretKey"), "p")
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractionError::Oracle(_)));
        assert!(!err.is_fatal());
        assert!(!err.to_string().contains("AIzaSecretKey"));
    }

    #[tokio::test]
    async fn test_unreachable_server_error_hides_key() {
        let oracle = GeminiOracle::new().with_base_url("http://127.0.0.1:1");
        let err = oracle
            .generate(&SecretString::new("AIzaSecretKey"), "p")
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractionError::Oracle(_)));
        assert!(!err.to_string().contains("AIzaSecretKey"));
    }
}
