//! Birding Challenge Extraction Library
//!
//! Fills a table of birding-challenge articles, keyed by URL, with attributes
//! an LLM extracts from each article's text.
//!
//! # Flow
//!
//! For every URL in the table's key column:
//!
//! 1. fetch the page and reduce it to readable text
//! 2. render a prompt embedding the text
//! 3. ask the oracle, rotating through a credential pool on failure
//! 4. parse the reply into the fixed field set
//! 5. merge the values into every row with that URL and persist
//!
//! A failed fetch degrades to marker content; a failed oracle call skips the
//! URL. Exhausting the credential pool or failing to write the table stops
//! the batch.
//!
//! # Usage
//!
//! ```rust,ignore
//! use challenge_extraction::{
//!     Credentials, CsvStore, GeminiOracle, HttpFetcher, Pipeline, PipelineConfig, PromptFormat,
//! };
//!
//! let pipeline = Pipeline::new(
//!     HttpFetcher::new(FetchConfig::default())?,
//!     GeminiOracle::new(),
//!     CsvStore::in_place("challenges.csv"),
//!     PromptFormat::Json.strategy(),
//!     Credentials::pool(keys)?,
//!     PipelineConfig::default(),
//! );
//! let report = pipeline.run().await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Seams between the driver and its collaborators
//! - [`types`] - Field set, results, pages and configuration
//! - [`pipeline`] - Prompts, reply parsers, rotation and the batch driver
//! - [`fetchers`] - HTTP fetcher and readable-text extraction
//! - [`stores`] - Table model, CSV and in-memory row stores
//! - [`security`] - Credentials and credential pools
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod fetchers;
pub mod pipeline;
pub mod security;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

pub mod ai;

// Re-export core types at crate root
pub use error::{ExtractionError, FetchError, SecurityError, StoreError};
pub use traits::{
    fetcher::ContentFetcher, oracle::Oracle, store::RowStore, strategy::ExtractionStrategy,
};
pub use types::{
    config::{FetchConfig, PersistMode, PipelineConfig, RetryPolicy, DEFAULT_KEY_COLUMN},
    fields::{FieldKey, FieldKind, FieldValue, MISSING_SENTINEL},
    page::FetchedPage,
    result::ExtractionResult,
};

// Re-export pipeline components
pub use pipeline::{
    call_oracle, parse_json_reply, parse_labeled_reply, template_hash, FailedUrl,
    JsonObjectStrategy, LabeledLinesStrategy, Pipeline, PromptFormat, RunReport,
};

pub use fetchers::HttpFetcher;
pub use security::{CredentialPool, Credentials, SecretString};
pub use stores::{Cell, CsvStore, MemoryStore, Table};

#[cfg(feature = "gemini")]
pub use ai::{GeminiOracle, DEFAULT_GEMINI_MODEL};

// Re-export testing utilities
pub use testing::{MockFetcher, ScriptedOracle};
