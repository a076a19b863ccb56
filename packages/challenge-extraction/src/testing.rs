//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the extraction library
//! without making real oracle or network calls.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, RwLock};

use crate::error::{ExtractionError, FetchError, FetchResult, Result};
use crate::security::SecretString;
use crate::traits::{fetcher::ContentFetcher, oracle::Oracle};
use crate::types::page::FetchedPage;

/// One scripted oracle outcome.
#[derive(Debug, Clone)]
enum Scripted {
    Reply(String),
    Failure(String),
}

/// A mock oracle that answers from a script.
///
/// Each call consumes the next scripted outcome in order. Once the script
/// is used up, calls fall back to the default outcome (an empty reply unless
/// configured otherwise).
#[derive(Debug)]
pub struct ScriptedOracle {
    script: Mutex<VecDeque<Scripted>>,
    fallback: Scripted,
    calls: Arc<RwLock<Vec<OracleCall>>>,
}

/// Record of a call made to the scripted oracle.
#[derive(Debug, Clone)]
pub struct OracleCall {
    pub credential: String,
    pub prompt: String,
}

impl Default for ScriptedOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedOracle {
    /// Oracle that answers every call with an empty reply.
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Scripted::Reply(String::new()),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Oracle that answers every call with `reply`.
    pub fn always(reply: impl Into<String>) -> Self {
        Self {
            fallback: Scripted::Reply(reply.into()),
            ..Self::new()
        }
    }

    /// Oracle whose every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fallback: Scripted::Failure(message.into()),
            ..Self::new()
        }
    }

    /// Queue a successful reply.
    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.script.lock().unwrap().push_back(Scripted::Reply(reply.into()));
        self
    }

    /// Queue a failed attempt.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Failure(message.into()));
        self
    }

    /// Get all calls made to this oracle.
    pub fn calls(&self) -> Vec<OracleCall> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Credentials presented, in call order.
    pub fn credentials_used(&self) -> Vec<String> {
        self.calls
            .read()
            .unwrap()
            .iter()
            .map(|c| c.credential.clone())
            .collect()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn generate(&self, credential: &SecretString, prompt: &str) -> Result<String> {
        self.calls.write().unwrap().push(OracleCall {
            credential: credential.expose().to_string(),
            prompt: prompt.to_string(),
        });

        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match next {
            Scripted::Reply(reply) => Ok(reply),
            Scripted::Failure(message) => Err(ExtractionError::Oracle(message.into())),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// A mock fetcher that serves predefined pages.
///
/// Unknown URLs fail with HTTP 404.
#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, FetchedPage>,
    failures: HashMap<String, u16>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve a page with the given title and text.
    pub fn with_page(
        mut self,
        url: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let url = url.into();
        let page = FetchedPage::new(url.clone(), text)
            .with_title(title)
            .with_status(200);
        self.pages.insert(url, page);
        self
    }

    /// Answer a URL with a non-success status.
    pub fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.failures.insert(url.into(), status);
        self
    }

    /// URLs fetched, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl ContentFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        self.calls.write().unwrap().push(url.to_string());

        if let Some(page) = self.pages.get(url) {
            return Ok(page.clone());
        }

        Err(FetchError::Status {
            url: url.to_string(),
            status: self.failures.get(url).copied().unwrap_or(404),
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
