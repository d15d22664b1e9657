use anyhow::Result;
use serde::Serialize;

use super::open_database;
use crate::adapters::sqlite::{ping, Migrator};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

#[derive(Debug, Serialize)]
pub struct MigrateOutput {
    pub database: String,
    pub schema_version: i64,
}

impl CommandOutput for MigrateOutput {
    fn to_human(&self) -> String {
        format!("Database ready at {} (schema version {})", self.database, self.schema_version)
    }
}

pub async fn execute(config: &Config, json_mode: bool) -> Result<()> {
    let pool = open_database(config).await?;
    ping(&pool).await?;
    let schema_version = Migrator::new(pool).get_current_version().await?;

    output(
        &MigrateOutput {
            database: config.database.path.clone(),
            schema_version,
        },
        json_mode,
    );
    Ok(())
}
