//! Command-line interface.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::import::ImportArgs;
pub use commands::races::RacesArgs;
pub use commands::serve::ServeArgs;
pub use output::{output, CommandOutput};

#[derive(Parser, Debug)]
#[command(name = "pitline")]
#[command(about = "Formula 1 telemetry ingestion, caching and strategy backend", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file merged over .pitline/config.yaml
    #[arg(short, long, global = true, env = "PITLINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the REST API server
    Serve(ServeArgs),

    /// Create the database and apply migrations
    Migrate,

    /// Insert the 2024 calendar, circuits and driver grid
    Seed,

    /// Import race telemetry from the timing archive
    Import(ImportArgs),

    /// Query stored races
    Races(RacesArgs),
}

/// Print a command failure and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({
            "success": false,
            "error": format!("{err:#}"),
        });
        eprintln!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
