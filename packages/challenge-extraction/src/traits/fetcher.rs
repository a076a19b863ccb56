//! Content fetcher trait.

use async_trait::async_trait;

use crate::error::FetchResult;
use crate::types::page::FetchedPage;

/// Retrieves a URL and reduces it to readable text plus a title.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch one page.
    ///
    /// Network failures, timeouts and non-2xx statuses are returned as
    /// `FetchError`; the driver turns them into degraded marker pages.
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage>;

    /// Fetch, degrading any failure to a marker page instead of an error.
    async fn fetch_or_marker(&self, url: &str) -> FetchedPage {
        match self.fetch(url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, stage = "fetch", "Fetch failed, continuing with marker content");
                FetchedPage::failed(url, &e)
            }
        }
    }

    /// Name for log lines.
    fn name(&self) -> &str {
        "fetcher"
    }
}
