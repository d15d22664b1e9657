//! Strategy calculators behind the simulation endpoints.
//!
//! Each calculator is a pure function over stored lap data; [`StrategyService`]
//! loads the laps and pit stops it needs. [`SimulationService`] runs the
//! pit-stop model for a user and persists the outcome.

pub mod defend;
pub mod overtake;
pub mod pit_stop;
pub mod simulation;
pub mod weather;

pub use defend::DefenseSimulation;
pub use overtake::{OvertakeOpportunity, OvertakeSimulation};
pub use pit_stop::{PitStopSimulation, TireDegradation};
pub use simulation::SimulationService;
pub use weather::{WeatherCondition, WeatherSimulation};

use std::sync::Arc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::LapData;
use crate::domain::ports::{LapRepository, PitStopRepository};

/// Seconds lost to a stop beyond the pit lane, before the pit-lane share of a lap.
pub const PIT_STOP_BASE_LOSS: f64 = 22.0;

/// Share of an average lap spent driving through the pit lane.
pub const PIT_LANE_LAP_SHARE: f64 = 0.15;

pub struct StrategyService {
    laps: Arc<dyn LapRepository>,
    pit_stops: Arc<dyn PitStopRepository>,
}

impl StrategyService {
    pub fn new(laps: Arc<dyn LapRepository>, pit_stops: Arc<dyn PitStopRepository>) -> Self {
        Self { laps, pit_stops }
    }

    async fn require_laps(&self, race_id: i64, driver_id: i64) -> DomainResult<Vec<LapData>> {
        let laps = self.laps.driver_laps(race_id, driver_id).await?;
        if laps.is_empty() {
            return Err(DomainError::InvalidInput(format!(
                "no lap data for driver {driver_id} in race {race_id}"
            )));
        }
        Ok(laps)
    }
}

/// Mean of the positive lap times.
pub(crate) fn average_lap_time(laps: &[LapData]) -> f64 {
    let times: Vec<f64> = laps.iter().map(|l| l.lap_time_seconds).filter(|t| *t > 0.0).collect();
    if times.is_empty() {
        return 0.0;
    }
    times.iter().sum::<f64>() / times.len() as f64
}

/// Time lost to one stop for a driver lapping at `avg_lap`.
pub(crate) fn pit_stop_loss(avg_lap: f64) -> f64 {
    PIT_STOP_BASE_LOSS + avg_lap * PIT_LANE_LAP_SHARE
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
pub(crate) fn test_lap(
    driver_id: i64,
    lap_number: i64,
    position: i64,
    time: f64,
    compound: crate::domain::models::TireCompound,
    tire_age: i64,
) -> LapData {
    LapData {
        id: driver_id * 1000 + lap_number,
        race_id: 1,
        driver_id,
        lap_number,
        position,
        lap_time_seconds: time,
        sector_times: crate::domain::models::SectorTimes::default(),
        tire_compound: compound,
        tire_age,
        gap_to_leader: None,
        gap_to_ahead: None,
        created_at: chrono::Utc::now(),
        updated_at: None,
    }
}
