//! HTTP content fetcher.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use tracing::{debug, warn};
use url::Url;

use super::readable::extract_readable;
use crate::error::{ExtractionError, FetchError, FetchResult, Result};
use crate::traits::fetcher::ContentFetcher;
use crate::types::config::FetchConfig;
use crate::types::page::FetchedPage;

/// Fetches pages over HTTP with a browser-like identity and reduces them to
/// readable text.
///
/// No JavaScript rendering; static HTML only.
pub struct HttpFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl HttpFetcher {
    /// Create a fetcher with its own HTTP client.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| ExtractionError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Use a preconfigured client.
    pub fn with_client(client: reqwest::Client, config: FetchConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn transport_error(url: &str, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Http {
                url: url.to_string(),
                source: Box::new(error),
            }
        }
    }
}

/// Parse a URL, accepting only http and https.
pub fn validate_url(url: &str) -> FetchResult<Url> {
    let invalid = || FetchError::InvalidUrl {
        url: url.to_string(),
    };
    let parsed = Url::parse(url.trim()).map_err(|_| invalid())?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        _ => Err(invalid()),
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        let target = validate_url(url)?;
        debug!(url = %url, "HTTP fetch starting");

        let response = self
            .client
            .get(target)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "HTTP request failed");
                Self::transport_error(url, e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| Self::transport_error(url, e))?;

        let readable = extract_readable(&html);
        debug!(
            url = %url,
            status = status.as_u16(),
            html_len = html.len(),
            text_len = readable.text.len(),
            "HTTP fetch complete"
        );

        let mut page = FetchedPage::new(url, readable.text).with_status(status.as_u16());
        if let Some(title) = readable.title {
            page = page.with_title(title);
        }
        Ok(page)
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com/challenge").is_ok());
        assert!(validate_url(" http://example.com ").is_ok());
        assert!(matches!(
            validate_url("not a url"),
            Err(FetchError::InvalidUrl { .. })
        ));
        assert!(matches!(
            validate_url("ftp://example.com/file"),
            Err(FetchError::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_url_is_not_requested() {
        let fetcher = HttpFetcher::new(FetchConfig::default()).unwrap();
        let err = fetcher.fetch("javascript:alert(1)").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }
}
