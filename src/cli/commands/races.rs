use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use super::open_database;
use crate::adapters::sqlite::SqliteRaceRepository;
use crate::cli::output::{output, table, CommandOutput};
use crate::domain::models::{Config, Race};
use crate::domain::ports::{RaceFilter, RaceRepository};

#[derive(Args, Debug)]
pub struct RacesArgs {
    #[command(subcommand)]
    pub command: RacesCommands,
}

#[derive(Subcommand, Debug)]
pub enum RacesCommands {
    /// List races
    List {
        /// Only races of this season
        #[arg(short, long)]
        season: Option<i64>,
    },
}

#[derive(Debug, Serialize)]
pub struct RaceListOutput {
    pub races: Vec<Race>,
    pub total: usize,
}

impl CommandOutput for RaceListOutput {
    fn to_human(&self) -> String {
        if self.races.is_empty() {
            return "No races found. Run 'pitline seed' first.".to_string();
        }

        let mut t = table(["ID", "Season", "Round", "Race", "Country", "Date", "Status", "Imported"]);
        for race in &self.races {
            t.add_row(vec![
                race.id.to_string(),
                race.season.to_string(),
                race.round.to_string(),
                race.name.clone(),
                race.country.clone(),
                race.date.format("%Y-%m-%d").to_string(),
                race.status.as_str().to_string(),
                if race.data_imported { "yes" } else { "no" }.to_string(),
            ]);
        }
        format!("{t}\n{} race(s)", self.total)
    }
}

pub async fn execute(args: RacesArgs, config: &Config, json_mode: bool) -> Result<()> {
    let pool = open_database(config).await?;
    let repo = SqliteRaceRepository::new(pool);

    match args.command {
        RacesCommands::List { season } => {
            let filter = RaceFilter {
                season,
                ..Default::default()
            };
            let races = repo.list(filter).await?;
            let total = races.len();
            output(&RaceListOutput { races, total }, json_mode);
        }
    }
    Ok(())
}
