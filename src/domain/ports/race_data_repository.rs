//! Ports for per-race telemetry: laps, pit stops and results.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{LapData, NormalizedRace, PitStop, RaceResult, ResultWithDriver};

/// Read access to lap data.
#[async_trait]
pub trait LapRepository: Send + Sync {
    /// Laps of a race ordered by driver then lap, optionally for one driver.
    async fn race_laps(&self, race_id: i64, driver_id: Option<i64>) -> DomainResult<Vec<LapData>>;

    /// Laps of one driver ordered by lap number.
    async fn driver_laps(&self, race_id: i64, driver_id: i64) -> DomainResult<Vec<LapData>>;

    /// Fastest lap with a positive time, optionally for one driver.
    async fn fastest_lap(&self, race_id: i64, driver_id: Option<i64>) -> DomainResult<Option<LapData>>;

    async fn lap_by_number(&self, race_id: i64, driver_id: i64, lap_number: i64) -> DomainResult<Option<LapData>>;

    async fn count_for_race(&self, race_id: i64) -> DomainResult<i64>;
}

/// Read access to pit stops.
#[async_trait]
pub trait PitStopRepository: Send + Sync {
    /// Pit stops of a race ordered by lap.
    async fn race_pit_stops(&self, race_id: i64, driver_id: Option<i64>) -> DomainResult<Vec<PitStop>>;

    /// Pit stops of one driver ordered by stop number.
    async fn driver_pit_stops(&self, race_id: i64, driver_id: i64) -> DomainResult<Vec<PitStop>>;
}

/// Read access to race classifications.
#[async_trait]
pub trait RaceResultRepository: Send + Sync {
    /// Results ordered by final position, unclassified last.
    async fn race_results(&self, race_id: i64) -> DomainResult<Vec<RaceResult>>;

    /// Same ordering as `race_results`, drivers loaded in the same query.
    async fn race_results_with_drivers(&self, race_id: i64) -> DomainResult<Vec<ResultWithDriver>>;

    async fn driver_results(&self, driver_id: i64) -> DomainResult<Vec<RaceResult>>;
}

/// Write side of the ingestion pipeline.
#[async_trait]
pub trait RaceDataWriter: Send + Sync {
    /// Atomically replace the laps, pit stops and results of a race, then
    /// mark it imported.
    async fn replace_race_data(&self, race_id: i64, data: &NormalizedRace) -> DomainResult<()>;
}
