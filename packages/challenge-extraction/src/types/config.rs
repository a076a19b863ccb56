//! Configuration types for fetching, oracle retries and the pipeline driver.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Column holding each record's source URL unless configured otherwise.
pub const DEFAULT_KEY_COLUMN: &str = "Article URL";

/// Browser-like identity sent with page fetches.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// When the table is written back to its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistMode {
    /// After every processed row; bounds data loss on a crash.
    #[default]
    PerRow,
    /// Once, after the whole batch.
    EndOfBatch,
}

/// Retry behaviour when rotating through a credential pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Hard ceiling on oracle calls for one URL, across the whole pool.
    ///
    /// Default: 10.
    pub max_attempts: usize,

    /// Fixed pause between attempts. No backoff growth.
    ///
    /// Default: 1 second.
    #[serde(with = "duration_millis")]
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Policy without inter-attempt delay (tests, local oracles).
    pub fn immediate(max_attempts: usize) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }
}

/// HTTP settings for the content fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Identity header sent with every request.
    pub user_agent: String,

    /// Upper bound on a single fetch.
    ///
    /// Default: 10 seconds.
    #[serde(with = "duration_millis")]
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl FetchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Configuration for the pipeline driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Column holding the URL key.
    pub key_column: String,

    /// Retry behaviour for credential pools.
    pub retry: RetryPolicy,

    /// When to write the table back.
    pub persist: PersistMode,

    /// Process at most this many URLs (None = all).
    pub limit: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            key_column: DEFAULT_KEY_COLUMN.to_string(),
            retry: RetryPolicy::default(),
            persist: PersistMode::default(),
            limit: None,
        }
    }
}

impl PipelineConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key_column(mut self, column: impl Into<String>) -> Self {
        self.key_column = column.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_persist(mut self, persist: PersistMode) -> Self {
        self.persist = persist;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.key_column, "Article URL");
        assert_eq!(config.retry.max_attempts, 10);
        assert_eq!(config.retry.delay, Duration::from_secs(1));
        assert_eq!(config.persist, PersistMode::PerRow);
        assert!(config.limit.is_none());
    }

    #[test]
    fn test_retry_policy_floor() {
        assert_eq!(RetryPolicy::immediate(0).max_attempts, 1);
    }

    #[test]
    fn test_config_serde_uses_millis() {
        let config = PipelineConfig::new()
            .with_retry(RetryPolicy::new(3, Duration::from_millis(250)))
            .with_persist(PersistMode::EndOfBatch);
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["retry"]["delay"], 250);
        assert_eq!(json["persist"], "end_of_batch");

        let back: PipelineConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back.retry.delay, Duration::from_millis(250));
    }
}
