//! Common test utilities for integration tests
//!
//! Provides shared fixtures used across the integration test files: a
//! migrated and seeded database, a canned timing source and sample telemetry.

#![allow(dead_code)]

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

use pitline::adapters::sqlite::{
    create_migrated_test_pool, SqliteCircuitRepository, SqliteDriverRepository, SqliteRaceRepository,
};
use pitline::domain::models::{DriverEntry, RawLap, SessionKey, SessionTelemetry};
use pitline::domain::ports::TimingSource;
use pitline::services::SeedService;
use pitline::{DomainError, DomainResult};

/// Create a temporary directory for test isolation
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Initialize a tracing subscriber that writes through the test harness.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// In-memory database with migrations applied and the 2024 reference data seeded.
pub async fn seeded_pool() -> SqlitePool {
    let pool = create_migrated_test_pool().await.expect("failed to create test pool");
    SeedService::new(
        Arc::new(SqliteCircuitRepository::new(pool.clone())),
        Arc::new(SqliteRaceRepository::new(pool.clone())),
        Arc::new(SqliteDriverRepository::new(pool.clone())),
    )
    .seed_2024()
    .await
    .expect("failed to seed");
    pool
}

/// A timing source that always answers with the same telemetry.
pub struct FixedSource {
    pub telemetry: Option<SessionTelemetry>,
    pub calls: AtomicUsize,
}

impl FixedSource {
    pub fn new(telemetry: SessionTelemetry) -> Self {
        Self {
            telemetry: Some(telemetry),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            telemetry: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TimingSource for FixedSource {
    async fn load_session(&self, key: &SessionKey) -> DomainResult<SessionTelemetry> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.telemetry {
            Some(telemetry) => {
                let mut telemetry = telemetry.clone();
                telemetry.key = key.clone();
                Ok(telemetry)
            }
            None => Err(DomainError::TimingUnavailable(key.event_name.clone())),
        }
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Ten laps for VER, LEC and the unseeded BEA. LEC pits at the end of lap 4
/// (soft to hard).
pub fn sample_telemetry() -> SessionTelemetry {
    let mut laps = Vec::new();
    for n in 1..=10 {
        laps.push(raw_lap("VER", n, 1, 95.0, "MEDIUM", 1));
        let (lec_time, compound, stint) = match n {
            4 => (117.0, "SOFT", 1),
            5 => (98.0, "HARD", 2),
            n if n < 4 => (95.5, "SOFT", 1),
            _ => (95.2, "HARD", 2),
        };
        laps.push(raw_lap("LEC", n, 2, lec_time, compound, stint));
        laps.push(raw_lap("BEA", n, 3, 97.0, "MEDIUM", 1));
    }

    SessionTelemetry {
        key: SessionKey::race(2024, "Bahrain Grand Prix"),
        drivers: vec![
            entry("VER", 1, "Max", "Verstappen", "Red Bull Racing"),
            entry("LEC", 16, "Charles", "Leclerc", "Ferrari"),
            entry("BEA", 38, "Oliver", "Bearman", "Ferrari"),
        ],
        laps,
    }
}

pub fn raw_lap(code: &str, lap_number: i64, position: i64, time: f64, compound: &str, stint: i64) -> RawLap {
    RawLap {
        driver_code: code.to_string(),
        lap_number,
        position: Some(position),
        lap_time: Some(time),
        sector1: Some(time * 0.3),
        sector2: Some(time * 0.4),
        sector3: Some(time * 0.3),
        compound: Some(compound.to_string()),
        tyre_life: Some(lap_number),
        stint: Some(stint),
        pit_in_time: None,
        pit_out_time: None,
    }
}

fn entry(code: &str, number: i64, first: &str, last: &str, team: &str) -> DriverEntry {
    DriverEntry {
        code: code.to_string(),
        number: Some(number),
        first_name: Some(first.to_string()),
        last_name: Some(last.to_string()),
        team: Some(team.to_string()),
    }
}
