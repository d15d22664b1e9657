//! Pitline - Formula 1 telemetry backend
//!
//! Pitline downloads race telemetry from a public timing archive, normalizes
//! it into laps, pit stops and classified results, caches raw sessions in
//! Redis and on disk, and serves races, drivers and strategy simulations over
//! a REST API.
//!
//! # Architecture
//!
//! The crate follows Hexagonal Architecture:
//!
//! - **Domain Layer** (`domain`): models, errors and port traits
//! - **Adapters** (`adapters`): SQLite repositories, the archive client, cache tiers and the HTTP API
//! - **Service Layer** (`services`): ingestion, seeding, queries, auth and strategy
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use pitline::adapters::sqlite::create_migrated_test_pool;
//! use pitline::services::SeedService;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = create_migrated_test_pool().await?;
//!     // Wire repositories into a SeedService and call seed_2024()
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::models::{
    Circuit, Config, Driver, LapData, PitStop, Race, RaceResult, RaceStatus, Simulation, TireCompound, User,
};
pub use domain::ports::{DriverRepository, RaceRepository, TimingSource};
pub use domain::{DomainError, DomainResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{RaceImportService, StrategyService};
