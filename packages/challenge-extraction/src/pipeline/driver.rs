//! Batch driver: every URL of the table through fetch, oracle, parse and merge.

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::prompts::template_hash;
use super::rotation::call_oracle;
use crate::error::{ExtractionError, Result};
use crate::security::Credentials;
use crate::stores::table::Table;
use crate::traits::{
    fetcher::ContentFetcher, oracle::Oracle, store::RowStore, strategy::ExtractionStrategy,
};
use crate::types::config::{PersistMode, PipelineConfig};
use crate::types::fields::FieldKey;
use crate::types::result::ExtractionResult;

/// A URL that failed without stopping the batch.
#[derive(Debug, Clone, Serialize)]
pub struct FailedUrl {
    pub url: String,
    /// Pipeline stage that failed (`fetch`, `oracle`, `store`, ...)
    pub stage: &'static str,
    pub error: String,
}

/// Outcome of a completed batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// URLs whose result was merged into at least one row
    pub processed: usize,

    /// URLs skipped after a non-fatal error
    pub failed: Vec<FailedUrl>,

    /// Number of times the table was written
    pub persisted: usize,
}

impl RunReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Stage label for log lines and reports.
fn stage_of(error: &ExtractionError) -> &'static str {
    match error {
        ExtractionError::Fetch(_) => "fetch",
        ExtractionError::Oracle(_) | ExtractionError::CredentialsExhausted { .. } => "oracle",
        ExtractionError::Store(_) => "store",
        ExtractionError::Security(_) | ExtractionError::Config(_) => "config",
    }
}

/// The extraction pipeline.
///
/// Generic over its collaborators so tests can swap in mocks. URLs are
/// processed strictly one after another.
pub struct Pipeline<F, O, S> {
    fetcher: F,
    oracle: O,
    store: S,
    strategy: Box<dyn ExtractionStrategy>,
    credentials: Credentials,
    config: PipelineConfig,
}

impl<F, O, S> Pipeline<F, O, S>
where
    F: ContentFetcher,
    O: Oracle,
    S: RowStore,
{
    pub fn new(
        fetcher: F,
        oracle: O,
        store: S,
        strategy: Box<dyn ExtractionStrategy>,
        credentials: Credentials,
        config: PipelineConfig,
    ) -> Self {
        Self {
            fetcher,
            oracle,
            store,
            strategy,
            credentials,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn strategy(&self) -> &dyn ExtractionStrategy {
        self.strategy.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Fetch, prompt and parse one URL without touching any table.
    ///
    /// Fetch failures are degraded to marker content, so the only errors are
    /// oracle errors.
    pub async fn extract(&self, url: &str) -> Result<ExtractionResult> {
        let page = self.fetcher.fetch_or_marker(url).await;
        let prompt = self.strategy.render(&page.prompt_content());

        let reply = call_oracle(
            &self.oracle,
            &self.credentials,
            &self.config.retry,
            url,
            &prompt,
        )
        .await?;
        debug!(url = %url, reply = %reply, "Raw oracle reply");

        let result = self.strategy.parse(&reply);
        debug!(
            url = %url,
            found = result.found_count(),
            degraded = page.degraded,
            "Parsed reply"
        );
        Ok(result)
    }

    /// Process one URL and merge its result into `table`.
    ///
    /// Returns the number of rows updated, zero when the URL is not in the
    /// key column. Errors are returned as-is.
    pub async fn process_url(&self, table: &mut Table, url: &str) -> Result<usize> {
        let result = self.extract(url).await?;
        let rows = table.merge(&self.config.key_column, url, &result)?;
        if rows == 0 {
            debug!(url = %url, "URL not in table, nothing merged");
        }
        Ok(rows)
    }

    /// Run the whole batch.
    ///
    /// Stops at the first fatal error (exhausted credentials, storage
    /// failure); every other per-URL error is logged, recorded in the report
    /// and skipped.
    pub async fn run(&self) -> Result<RunReport> {
        info!(
            strategy = self.strategy.name(),
            template_hash = %template_hash(self.strategy.template()),
            destination = %self.store.describe(),
            rotating = self.credentials.is_pool(),
            "Starting extraction run"
        );

        if let Err(e) = self.store.probe_writable() {
            error!(destination = %self.store.describe(), error = %e, "Destination not writable");
            return Err(e.into());
        }

        let mut table = self.store.load()?;
        let added = table.ensure_columns(FieldKey::columns());
        if !added.is_empty() {
            info!(columns = ?added, "Added missing field columns");
        }

        let mut urls = table.urls(&self.config.key_column)?;
        if let Some(limit) = self.config.limit {
            urls.truncate(limit);
        }
        let total = urls.len();
        info!(urls = total, rows = table.len(), "Collected URLs");

        let mut report = RunReport::default();

        for (i, url) in urls.iter().enumerate() {
            info!(url = %url, position = i + 1, total, "Processing URL");

            match self.process_url(&mut table, url).await {
                Ok(rows) => {
                    report.processed += 1;
                    info!(url = %url, rows, "Merged extraction");
                }
                Err(e) if e.is_fatal() => {
                    error!(url = %url, stage = stage_of(&e), error = %e, "Fatal error, stopping batch");
                    return Err(e);
                }
                Err(e) => {
                    let stage = stage_of(&e);
                    warn!(url = %url, stage, error = %e, "URL failed, continuing");
                    report.failed.push(FailedUrl {
                        url: url.clone(),
                        stage,
                        error: e.to_string(),
                    });
                    continue;
                }
            }

            if self.config.persist == PersistMode::PerRow {
                self.persist(&table)?;
                report.persisted += 1;
            }
        }

        if self.config.persist == PersistMode::EndOfBatch {
            self.persist(&table)?;
            report.persisted += 1;
        }

        info!(
            processed = report.processed,
            failed = report.failed.len(),
            persisted = report.persisted,
            "Extraction run finished"
        );
        Ok(report)
    }

    fn persist(&self, table: &Table) -> Result<()> {
        self.store.persist(table).map_err(|e| {
            error!(destination = %self.store.describe(), error = %e, "Persist failed, stopping batch");
            ExtractionError::from(e)
        })
    }
}
