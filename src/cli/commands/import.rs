use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::sync::Arc;

use super::{open_database, timing_source};
use crate::adapters::cache::CachedDriverRepository;
use crate::adapters::sqlite::{
    SqliteCircuitRepository, SqliteDriverRepository, SqliteRaceDataWriter, SqliteRaceRepository,
};
use crate::cli::output::{output, spinner, CommandOutput};
use crate::domain::models::Config;
use crate::services::{ImportReport, RaceImportService};

#[derive(Args, Debug)]
pub struct ImportArgs {
    #[command(subcommand)]
    pub command: ImportCommands,
}

#[derive(Subcommand, Debug)]
pub enum ImportCommands {
    /// Import one race, replacing any stored telemetry for it
    Race {
        /// Championship year
        season: i64,
        /// Round number within the season
        round: i64,
    },
    /// Import the earliest completed race that has no telemetry yet
    Next,
}

#[derive(Debug, Serialize)]
pub struct ImportOutput {
    pub imported: Option<ImportReport>,
}

impl CommandOutput for ImportOutput {
    fn to_human(&self) -> String {
        match &self.imported {
            None => "No completed races are waiting for import.".to_string(),
            Some(r) => format!(
                "Imported {} {} (round {}): {} laps, {} pit stops, {} drivers ({} new) from {}",
                r.season, r.race_name, r.round, r.laps, r.pit_stops, r.drivers, r.created_drivers, r.source
            ),
        }
    }
}

pub async fn execute(args: ImportArgs, config: &Config, json_mode: bool) -> Result<()> {
    let pool = open_database(config).await?;
    let service = RaceImportService::new(
        Arc::new(SqliteRaceRepository::new(pool.clone())),
        Arc::new(SqliteCircuitRepository::new(pool.clone())),
        Arc::new(CachedDriverRepository::new(Arc::new(SqliteDriverRepository::new(pool.clone())))),
        Arc::new(SqliteRaceDataWriter::new(pool)),
        timing_source(config)?,
    );

    let imported = match args.command {
        ImportCommands::Race { season, round } => {
            let progress = spinner(format!("Importing {season} round {round}..."), json_mode);
            let result = service.import_race(season, round).await;
            progress.finish_and_clear();
            Some(result.with_context(|| format!("Import of {season} round {round} failed"))?)
        }
        ImportCommands::Next => {
            let progress = spinner("Looking for completed races without telemetry...", json_mode);
            let result = service.import_next_pending().await;
            progress.finish_and_clear();
            result.context("Import failed")?
        }
    };

    output(&ImportOutput { imported }, json_mode);
    Ok(())
}
