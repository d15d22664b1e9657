use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;

use super::open_database;
use crate::adapters::sqlite::{SqliteCircuitRepository, SqliteDriverRepository, SqliteRaceRepository};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::services::{SeedReport, SeedService};

#[derive(Debug, Serialize)]
pub struct SeedOutput {
    #[serde(flatten)]
    pub report: SeedReport,
}

impl CommandOutput for SeedOutput {
    fn to_human(&self) -> String {
        let r = &self.report;
        if r.circuits_created + r.races_created + r.drivers_created == 0 {
            return "Reference data already present, nothing to seed.".to_string();
        }
        format!(
            "Seeded {} circuit(s), {} race(s) and {} driver(s).",
            r.circuits_created, r.races_created, r.drivers_created
        )
    }
}

pub async fn execute(config: &Config, json_mode: bool) -> Result<()> {
    let pool = open_database(config).await?;
    let service = SeedService::new(
        Arc::new(SqliteCircuitRepository::new(pool.clone())),
        Arc::new(SqliteRaceRepository::new(pool.clone())),
        Arc::new(SqliteDriverRepository::new(pool)),
    );

    let report = service.seed_2024().await.context("Failed to seed reference data")?;
    output(&SeedOutput { report }, json_mode);
    Ok(())
}
