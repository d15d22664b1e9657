//! SQLite database adapters for the Pitline backend.

pub mod circuit_repository;
pub mod connection;
pub mod driver_repository;
pub mod lap_repository;
pub mod migrations;
pub mod pit_stop_repository;
pub mod race_data_writer;
pub mod race_repository;
pub mod result_repository;
pub mod simulation_repository;
pub mod user_repository;

pub use circuit_repository::SqliteCircuitRepository;
pub use connection::{open_memory_pool, open_pool, ping, ConnectionError, DatabaseLocation};
pub use driver_repository::SqliteDriverRepository;
pub use lap_repository::SqliteLapRepository;
pub use migrations::{all_embedded_migrations, Migration, MigrationError, Migrator};
pub use pit_stop_repository::SqlitePitStopRepository;
pub use race_data_writer::SqliteRaceDataWriter;
pub use race_repository::SqliteRaceRepository;
pub use result_repository::SqliteRaceResultRepository;
pub use simulation_repository::SqliteSimulationRepository;
pub use user_repository::SqliteUserRepository;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::DatabaseConfig;

/// Parse an RFC3339 datetime string from a SQLite row field.
pub fn parse_datetime(s: &str) -> DomainResult<DateTime<Utc>> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map_err(|e| DomainError::SerializationError(e.to_string()))
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse an optional RFC3339 datetime string from a SQLite row field.
pub fn parse_optional_datetime(s: Option<String>) -> DomainResult<Option<DateTime<Utc>>> {
    s.map(|s| chrono::DateTime::parse_from_rfc3339(&s).map(|d| d.with_timezone(&Utc)))
        .transpose()
        .map_err(|e| DomainError::SerializationError(e.to_string()))
}

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),
    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),
    #[error("Query error: {0}")]
    Query(#[from] sqlx::Error),
}

/// Open the configured database and bring its schema up to date.
pub async fn initialize_database(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
    let pool = open_pool(config).await?;
    let migrator = Migrator::new(pool.clone());
    migrator.run_embedded_migrations(all_embedded_migrations()).await?;
    Ok(pool)
}

/// Create an in-memory test pool with all migrations applied.
pub async fn create_migrated_test_pool() -> Result<SqlitePool, DatabaseError> {
    let pool = open_memory_pool().await?;
    let migrator = Migrator::new(pool.clone());
    migrator.run_embedded_migrations(all_embedded_migrations()).await?;
    Ok(pool)
}

/// Append ` AND column = ?` for each present value and return the bindings in order.
pub(crate) fn push_int_filters(query: &mut String, filters: &[(&str, Option<i64>)]) -> Vec<i64> {
    let mut bindings = Vec::new();
    for (column, value) in filters {
        if let Some(value) = value {
            query.push_str(&format!(" AND {column} = ?"));
            bindings.push(*value);
        }
    }
    bindings
}
