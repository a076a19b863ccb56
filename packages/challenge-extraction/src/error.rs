//! Typed errors for the challenge extraction library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while processing a batch.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Content fetch failed
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// A single oracle attempt failed
    #[error("oracle error: {0}")]
    Oracle(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Every attempt across the credential pool failed
    #[error("all credentials failed for {url} after {attempts} attempts")]
    CredentialsExhausted { url: String, attempts: usize },

    /// Row store operation failed
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Credential configuration problem
    #[error("security error: {0}")]
    Security(#[from] SecurityError),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

impl ExtractionError {
    /// Whether this error must stop the whole batch rather than one URL.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::CredentialsExhausted { .. } | Self::Store(_))
    }
}

/// Errors that can occur while fetching page content.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, connection reset, body read)
    #[error("HTTP error for {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Server answered with a non-2xx status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// Request did not complete within the configured timeout
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// URL could not be parsed or uses an unsupported scheme
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
}

/// Errors raised by row store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Another process holds a lock on the destination
    #[error("file is locked (possibly open in a spreadsheet application): {path}")]
    Locked {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Destination cannot be opened for writing
    #[error("cannot write to {path}: {source}")]
    Unwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source cannot be read
    #[error("cannot read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV data
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Table does not contain the configured key column
    #[error("key column not found: {column}")]
    MissingKeyColumn { column: String },

    /// Other I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Credential-related errors.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// A credential pool needs at least one credential
    #[error("credential pool is empty")]
    EmptyPool,

    /// A credential was blank after trimming
    #[error("credential at position {0} is blank")]
    BlankCredential(usize),
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        let exhausted = ExtractionError::CredentialsExhausted {
            url: "https://example.com".to_string(),
            attempts: 3,
        };
        assert!(exhausted.is_fatal());

        let locked = ExtractionError::Store(StoreError::Locked {
            path: PathBuf::from("table.csv"),
            source: std::io::Error::new(std::io::ErrorKind::WouldBlock, "busy"),
        });
        assert!(locked.is_fatal());

        let oracle = ExtractionError::Oracle("Error 500: boom".into());
        assert!(!oracle.is_fatal());

        let fetch = ExtractionError::Fetch(FetchError::Timeout {
            url: "https://example.com".to_string(),
        });
        assert!(!fetch.is_fatal());
    }

    #[test]
    fn test_exhausted_message_names_url() {
        let err = ExtractionError::CredentialsExhausted {
            url: "https://example.com/c".to_string(),
            attempts: 10,
        };
        assert_eq!(
            err.to_string(),
            "all credentials failed for https://example.com/c after 10 attempts"
        );
    }
}
