//! Opening the race database.
//!
//! `database.path` names either a file, created with its parent directories
//! on first use, or `:memory:`. An in-memory database lives only as long as
//! its one connection, so it always gets a single-connection pool.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::domain::models::DatabaseConfig;

const BUSY_TIMEOUT: Duration = Duration::from_secs(30);
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Failed to open database at {location}: {source}")]
    Open {
        location: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("Failed to create database directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Database did not answer: {0}")]
    Unresponsive(#[source] sqlx::Error),
}

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    Memory,
    File(PathBuf),
}

impl DatabaseLocation {
    /// Accepts bare paths as well as `sqlite:` and `sqlite://` URLs.
    pub fn parse(path: &str) -> Self {
        let path = path
            .strip_prefix("sqlite://")
            .or_else(|| path.strip_prefix("sqlite:"))
            .unwrap_or(path);
        match path {
            "" | ":memory:" => Self::Memory,
            file => Self::File(PathBuf::from(file)),
        }
    }

    fn connect_options(&self) -> SqliteConnectOptions {
        let options = SqliteConnectOptions::new().foreign_keys(true);
        match self {
            Self::Memory => options.in_memory(true),
            Self::File(path) => options
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .busy_timeout(BUSY_TIMEOUT),
        }
    }
}

impl std::fmt::Display for DatabaseLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => f.write_str(":memory:"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Pool for the configured database.
pub async fn open_pool(config: &DatabaseConfig) -> Result<SqlitePool, ConnectionError> {
    let location = DatabaseLocation::parse(&config.path);
    let pool_options = match &location {
        DatabaseLocation::Memory => memory_pool_options(),
        DatabaseLocation::File(path) => {
            ensure_parent_dir(path)?;
            SqlitePoolOptions::new()
                .max_connections(config.max_connections.max(1))
                .min_connections(1)
                .acquire_timeout(ACQUIRE_TIMEOUT)
        }
    };

    debug!(%location, "opening database");
    pool_options
        .connect_with(location.connect_options())
        .await
        .map_err(|source| ConnectionError::Open {
            location: location.to_string(),
            source,
        })
}

/// Empty in-memory database, used by tests.
pub async fn open_memory_pool() -> Result<SqlitePool, ConnectionError> {
    let location = DatabaseLocation::Memory;
    memory_pool_options()
        .connect_with(location.connect_options())
        .await
        .map_err(|source| ConnectionError::Open {
            location: location.to_string(),
            source,
        })
}

// The connection must never be recycled or the database goes with it.
fn memory_pool_options() -> SqlitePoolOptions {
    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
}

fn ensure_parent_dir(path: &Path) -> Result<(), ConnectionError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            std::fs::create_dir_all(parent).map_err(|source| ConnectionError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

pub async fn ping(pool: &SqlitePool) -> Result<(), ConnectionError> {
    sqlx::query("SELECT 1")
        .fetch_one(pool)
        .await
        .map_err(ConnectionError::Unresponsive)?;
    Ok(())
}
