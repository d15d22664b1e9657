//! CLI command implementations.

pub mod import;
pub mod migrate;
pub mod races;
pub mod seed;
pub mod serve;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;

use crate::adapters::cache::TieredTimingSource;
use crate::adapters::sqlite::initialize_database;
use crate::adapters::timing::{TimingClientConfig, TracingInsightsClient};
use crate::domain::models::Config;
use crate::domain::ports::TimingSource;

/// Open the configured database, applying pending migrations.
pub async fn open_database(config: &Config) -> Result<SqlitePool> {
    initialize_database(&config.database)
        .await
        .with_context(|| format!("Failed to open database at {}", config.database.path))
}

/// The archive client behind the configured cache tiers.
pub fn timing_source(config: &Config) -> Result<Arc<dyn TimingSource>> {
    let client = TracingInsightsClient::new(TimingClientConfig::from_config(&config.timing, &config.retry))
        .context("Failed to create timing archive client")?;
    let source = TieredTimingSource::from_config(Arc::new(client), &config.cache);
    info!(tiers = ?source.tier_names(), "timing source ready");
    Ok(Arc::new(source))
}
