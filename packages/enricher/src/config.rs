use anyhow::{bail, Context, Result};
use challenge_extraction::{
    Credentials, FetchConfig, PersistMode, PipelineConfig, PromptFormat, RetryPolicy,
    DEFAULT_GEMINI_MODEL, DEFAULT_KEY_COLUMN,
};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub api_keys: Vec<String>,
    pub rotate_keys: bool,
    pub input_table: PathBuf,
    pub output_table: PathBuf,
    pub key_column: String,
    pub prompt_format: PromptFormat,
    pub max_attempts: usize,
    pub retry_delay: Duration,
    pub fetch_timeout: Duration,
    pub oracle_timeout: Duration,
    pub persist_mode: PersistMode,
    pub url_limit: Option<usize>,
    pub gemini_model: String,
    pub gemini_base_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Expects `.env` to have been loaded already.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from any name → value lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_keys: Vec<String> = var("GEMINI_API_KEYS")
            .context("GEMINI_API_KEYS must be set")?
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if api_keys.is_empty() {
            bail!("GEMINI_API_KEYS must contain at least one key");
        }

        let input_table = PathBuf::from(var("INPUT_TABLE").context("INPUT_TABLE must be set")?);
        let output_table = var("OUTPUT_TABLE")
            .map(PathBuf::from)
            .unwrap_or_else(|| input_table.clone());

        let persist_mode = match var("PERSIST_MODE").as_deref() {
            None | Some("row") => PersistMode::PerRow,
            Some("batch") => PersistMode::EndOfBatch,
            Some(other) => bail!("PERSIST_MODE must be 'row' or 'batch', got '{}'", other),
        };

        Ok(Self {
            rotate_keys: var("ROTATE_KEYS")
                .map(|v| v.parse::<bool>())
                .transpose()
                .context("ROTATE_KEYS must be true or false")?
                .unwrap_or(true),
            api_keys,
            input_table,
            output_table,
            key_column: var("KEY_COLUMN").unwrap_or_else(|| DEFAULT_KEY_COLUMN.to_string()),
            prompt_format: var("PROMPT_FORMAT")
                .map(|v| v.parse::<PromptFormat>())
                .transpose()
                .context("PROMPT_FORMAT must be 'json' or 'labeled'")?
                .unwrap_or_default(),
            max_attempts: var("MAX_ATTEMPTS")
                .unwrap_or_else(|| "10".to_string())
                .parse()
                .context("MAX_ATTEMPTS must be a valid number")?,
            retry_delay: Duration::from_millis(
                var("RETRY_DELAY_MS")
                    .unwrap_or_else(|| "1000".to_string())
                    .parse()
                    .context("RETRY_DELAY_MS must be a valid number")?,
            ),
            fetch_timeout: Duration::from_secs(
                var("FETCH_TIMEOUT_SECS")
                    .unwrap_or_else(|| "10".to_string())
                    .parse()
                    .context("FETCH_TIMEOUT_SECS must be a valid number")?,
            ),
            oracle_timeout: Duration::from_secs(
                var("ORACLE_TIMEOUT_SECS")
                    .unwrap_or_else(|| "60".to_string())
                    .parse()
                    .context("ORACLE_TIMEOUT_SECS must be a valid number")?,
            ),
            persist_mode,
            url_limit: var("URL_LIMIT")
                .map(|v| v.parse())
                .transpose()
                .context("URL_LIMIT must be a valid number")?,
            gemini_model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: var("GEMINI_BASE_URL"),
        })
    }

    /// One key is used alone; several rotate unless rotation is disabled.
    pub fn credentials(&self) -> Result<Credentials> {
        if self.api_keys.len() > 1 && self.rotate_keys {
            Credentials::pool(self.api_keys.clone()).context("Invalid GEMINI_API_KEYS")
        } else {
            Ok(Credentials::single(self.api_keys[0].clone()))
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        let config = PipelineConfig::new()
            .with_key_column(self.key_column.clone())
            .with_retry(RetryPolicy::new(self.max_attempts, self.retry_delay))
            .with_persist(self.persist_mode);
        match self.url_limit {
            Some(limit) => config.with_limit(limit),
            None => config,
        }
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig::new().with_timeout(self.fetch_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("GEMINI_API_KEYS", "k1"), ("INPUT_TABLE", "in.csv")]).unwrap();

        assert_eq!(config.output_table, PathBuf::from("in.csv"));
        assert_eq!(config.key_column, "Article URL");
        assert_eq!(config.prompt_format, PromptFormat::Json);
        assert_eq!(config.max_attempts, 10);
        assert_eq!(config.retry_delay, Duration::from_secs(1));
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert_eq!(config.oracle_timeout, Duration::from_secs(60));
        assert_eq!(config.persist_mode, PersistMode::PerRow);
        assert_eq!(config.gemini_model, "gemini-2.0-flash");
        assert!(config.url_limit.is_none());
        assert!(!config.credentials().unwrap().is_pool());
    }

    #[test]
    fn test_several_keys_rotate_unless_disabled() {
        let vars = [("GEMINI_API_KEYS", "k1, k2 ,k3"), ("INPUT_TABLE", "in.csv")];
        assert!(config(&vars).unwrap().credentials().unwrap().is_pool());

        let vars = [
            ("GEMINI_API_KEYS", "k1,k2"),
            ("INPUT_TABLE", "in.csv"),
            ("ROTATE_KEYS", "false"),
        ];
        assert!(!config(&vars).unwrap().credentials().unwrap().is_pool());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("GEMINI_API_KEYS", "k1"),
            ("INPUT_TABLE", "in.csv"),
            ("OUTPUT_TABLE", "out.csv"),
            ("KEY_COLUMN", "url"),
            ("PROMPT_FORMAT", "labeled"),
            ("MAX_ATTEMPTS", "4"),
            ("RETRY_DELAY_MS", "250"),
            ("ORACLE_TIMEOUT_SECS", "15"),
            ("PERSIST_MODE", "batch"),
            ("URL_LIMIT", "20"),
        ])
        .unwrap();

        assert_eq!(config.output_table, PathBuf::from("out.csv"));
        assert_eq!(config.prompt_format, PromptFormat::Labeled);
        assert_eq!(config.oracle_timeout, Duration::from_secs(15));
        let pipeline = config.pipeline_config();
        assert_eq!(pipeline.key_column, "url");
        assert_eq!(pipeline.retry.max_attempts, 4);
        assert_eq!(pipeline.retry.delay, Duration::from_millis(250));
        assert_eq!(pipeline.persist, PersistMode::EndOfBatch);
        assert_eq!(pipeline.limit, Some(20));
    }

    #[test]
    fn test_missing_or_invalid_values() {
        assert!(config(&[("INPUT_TABLE", "in.csv")]).is_err());
        assert!(config(&[("GEMINI_API_KEYS", " , "), ("INPUT_TABLE", "in.csv")]).is_err());
        assert!(config(&[("GEMINI_API_KEYS", "k1")]).is_err());
        assert!(config(&[
            ("GEMINI_API_KEYS", "k1"),
            ("INPUT_TABLE", "in.csv"),
            ("PERSIST_MODE", "sometimes"),
        ])
        .is_err());
        assert!(config(&[
            ("GEMINI_API_KEYS", "k1"),
            ("INPUT_TABLE", "in.csv"),
            ("MAX_ATTEMPTS", "many"),
        ])
        .is_err());
    }
}
