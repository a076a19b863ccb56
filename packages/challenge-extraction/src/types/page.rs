//! Fetched page content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Readable content of a fetched page.
///
/// A page that could not be fetched is still represented: its text is a
/// failure marker so the rest of the pipeline can run on degraded input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedPage {
    /// Requested URL
    pub url: String,

    /// Document title, if any
    pub title: Option<String>,

    /// Readable text, one block per line
    pub text: String,

    /// When the page was fetched
    pub fetched_at: DateTime<Utc>,

    /// HTTP status of the response (None when the fetch failed)
    pub status: Option<u16>,

    /// Whether this page stands in for a failed fetch
    pub degraded: bool,
}

impl FetchedPage {
    /// Create a page from extracted text.
    pub fn new(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            text: text.into(),
            fetched_at: Utc::now(),
            status: None,
            degraded: false,
        }
    }

    /// Page standing in for a failed fetch.
    pub fn failed(url: impl Into<String>, error: &FetchError) -> Self {
        Self {
            degraded: true,
            ..Self::new(url, format!("Failed to fetch page: {}", error))
        }
    }

    /// Set the page title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the HTTP status.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Text handed to the prompt: title header followed by the body.
    pub fn prompt_content(&self) -> String {
        if self.degraded {
            return self.text.clone();
        }
        format!(
            "Title: {}\n\n{}",
            self.title.as_deref().unwrap_or_default(),
            self.text
        )
    }

    /// Check if this page has content.
    pub fn has_content(&self) -> bool {
        !self.degraded && !self.text.trim().is_empty()
    }
}
