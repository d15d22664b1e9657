//! Race repository port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::errors::DomainResult;
use crate::domain::models::{NewRace, Race, RaceStatus, RaceWithCircuit, Season};

/// Filter criteria for listing races.
#[derive(Debug, Clone, Default)]
pub struct RaceFilter {
    pub season: Option<i64>,
    pub status: Option<RaceStatus>,
    pub imported: Option<bool>,
    pub limit: Option<u32>,
}

impl RaceFilter {
    pub fn season(season: i64) -> Self {
        Self {
            season: Some(season),
            ..Default::default()
        }
    }

    /// Completed races whose telemetry has not been imported yet.
    pub fn pending_import() -> Self {
        Self {
            status: Some(RaceStatus::Completed),
            imported: Some(false),
            ..Default::default()
        }
    }
}

/// Repository interface for races.
#[async_trait]
pub trait RaceRepository: Send + Sync {
    async fn create(&self, race: &NewRace) -> DomainResult<Race>;

    async fn get(&self, id: i64) -> DomainResult<Option<Race>>;

    /// Get a race together with its circuit.
    async fn get_with_circuit(&self, id: i64) -> DomainResult<Option<RaceWithCircuit>>;

    async fn get_by_season_round(&self, season: i64, round: i64) -> DomainResult<Option<Race>>;

    /// List races ordered by season, then round.
    async fn list(&self, filter: RaceFilter) -> DomainResult<Vec<Race>>;

    /// Flag a race as having its telemetry imported.
    async fn mark_imported(&self, id: i64, at: DateTime<Utc>) -> DomainResult<()>;

    /// Per-season race counts, newest season first.
    async fn season_summaries(&self) -> DomainResult<Vec<Season>>;
}
