//! Read-side queries over races, their telemetry and seasons.

use std::sync::Arc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{LapData, PitStop, Race, RaceWithCircuit, ResultWithDriver, Season};
use crate::domain::ports::{LapRepository, PitStopRepository, RaceFilter, RaceRepository, RaceResultRepository};

pub struct RaceService {
    races: Arc<dyn RaceRepository>,
    laps: Arc<dyn LapRepository>,
    pit_stops: Arc<dyn PitStopRepository>,
    results: Arc<dyn RaceResultRepository>,
}

impl RaceService {
    pub fn new(
        races: Arc<dyn RaceRepository>,
        laps: Arc<dyn LapRepository>,
        pit_stops: Arc<dyn PitStopRepository>,
        results: Arc<dyn RaceResultRepository>,
    ) -> Self {
        Self {
            races,
            laps,
            pit_stops,
            results,
        }
    }

    pub async fn list_races(&self, season: Option<i64>) -> DomainResult<Vec<Race>> {
        self.races
            .list(RaceFilter {
                season,
                ..Default::default()
            })
            .await
    }

    pub async fn get_race(&self, id: i64) -> DomainResult<RaceWithCircuit> {
        self.races
            .get_with_circuit(id)
            .await?
            .ok_or_else(|| DomainError::RaceNotFound(id.to_string()))
    }

    pub async fn race_laps(&self, race_id: i64, driver_id: Option<i64>) -> DomainResult<Vec<LapData>> {
        self.require_race(race_id).await?;
        self.laps.race_laps(race_id, driver_id).await
    }

    pub async fn race_pit_stops(&self, race_id: i64, driver_id: Option<i64>) -> DomainResult<Vec<PitStop>> {
        self.require_race(race_id).await?;
        self.pit_stops.race_pit_stops(race_id, driver_id).await
    }

    pub async fn race_results(&self, race_id: i64) -> DomainResult<Vec<ResultWithDriver>> {
        self.require_race(race_id).await?;
        self.results.race_results_with_drivers(race_id).await
    }

    pub async fn fastest_lap(&self, race_id: i64, driver_id: Option<i64>) -> DomainResult<LapData> {
        self.require_race(race_id).await?;
        self.laps.fastest_lap(race_id, driver_id).await?.ok_or_else(|| {
            DomainError::LapNotFound(match driver_id {
                Some(driver) => format!("no timed lap for driver {driver} in race {race_id}"),
                None => format!("no timed lap in race {race_id}"),
            })
        })
    }

    pub async fn seasons(&self) -> DomainResult<Vec<Season>> {
        self.races.season_summaries().await
    }

    pub async fn season(&self, year: i64) -> DomainResult<Season> {
        self.races
            .season_summaries()
            .await?
            .into_iter()
            .find(|s| s.year == year)
            .ok_or(DomainError::SeasonNotFound(year))
    }

    async fn require_race(&self, race_id: i64) -> DomainResult<Race> {
        self.races
            .get(race_id)
            .await?
            .ok_or_else(|| DomainError::RaceNotFound(race_id.to_string()))
    }
}
