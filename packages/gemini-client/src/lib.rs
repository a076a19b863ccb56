//! Pure Gemini REST API client.
//!
//! A minimal client for the `generateContent` endpoint. The API key is passed
//! per call so callers can rotate keys without rebuilding the client. It is
//! sent in the `x-goog-api-key` header and never appears in a request URL.
//!
//! # Example
//!
//! ```rust,ignore
//! use gemini_client::GeminiClient;
//!
//! let client = GeminiClient::new();
//! let response = client.generate_content(&api_key, "Say hello").await?;
//! println!("{}", response.first_text().unwrap_or("(no reply)"));
//! ```

pub mod error;
pub mod types;

pub use error::{GeminiError, Result};
pub use types::{Candidate, Content, GenerateContentRequest, GenerateContentResponse, Part};

use std::time::Duration;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GeminiClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Set a custom base URL (proxies, test servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the model (default: gemini-2.0-flash).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the request timeout (default: 60 seconds).
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(GeminiError::transport)?;
        Ok(self)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a single text prompt and return the decoded response envelope.
    pub async fn generate_content(
        &self,
        api_key: &str,
        prompt: &str,
    ) -> Result<GenerateContentResponse> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let request = GenerateContentRequest::from_prompt(prompt.trim());

        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "Sending generateContent");

        let resp = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(&request)
            .send()
            .await
            .map_err(GeminiError::transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GeminiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await.map_err(GeminiError::transport)?;
        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| GeminiError::Parse(format!("unexpected response body: {}", e)))?;

        if let Some(usage) = &parsed.usage_metadata {
            tracing::debug!(
                prompt_tokens = usage.prompt_token_count,
                candidate_tokens = usage.candidates_token_count,
                "generateContent completed"
            );
        }

        Ok(parsed)
    }

    /// Send a prompt and return only the first candidate's text.
    ///
    /// An envelope without candidates or text parts yields `None`.
    pub async fn generate_text(&self, api_key: &str, prompt: &str) -> Result<Option<String>> {
        let response = self.generate_content(api_key, prompt).await?;
        Ok(response.first_text().map(|t| t.to_string()))
    }
}
