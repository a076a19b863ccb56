//! Birding Challenge Enricher
//!
//! Reads a table of challenge articles, asks Gemini for each article's
//! attributes and writes them back into the table.

mod config;

use anyhow::{Context, Result};
use challenge_extraction::{CsvStore, GeminiOracle, HttpFetcher, Pipeline};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env once, before the filter reads RUST_LOG and before Config
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,challenge_extraction=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting birding challenge enricher");

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        input = %config.input_table.display(),
        output = %config.output_table.display(),
        keys = config.api_keys.len(),
        format = %config.prompt_format,
        model = %config.gemini_model,
        "Configuration loaded"
    );

    let fetcher =
        HttpFetcher::new(config.fetch_config()).context("Failed to build HTTP fetcher")?;

    let mut oracle = GeminiOracle::new()
        .with_model(config.gemini_model.clone())
        .with_timeout(config.oracle_timeout)
        .context("Failed to build Gemini client")?;
    if let Some(base_url) = &config.gemini_base_url {
        oracle = oracle.with_base_url(base_url.clone());
    }

    let pipeline = Pipeline::new(
        fetcher,
        oracle,
        CsvStore::new(&config.input_table, &config.output_table),
        config.prompt_format.strategy(),
        config.credentials()?,
        config.pipeline_config(),
    );

    let report = pipeline.run().await.context("Enrichment run aborted")?;

    if report.has_failures() {
        let skipped: Vec<&str> = report.failed.iter().map(|f| f.url.as_str()).collect();
        tracing::warn!(?skipped, "Some URLs were skipped and can be retried");
    }

    tracing::info!(
        processed = report.processed,
        failed = report.failed.len(),
        persisted = report.persisted,
        "Enrichment finished"
    );

    Ok(())
}
