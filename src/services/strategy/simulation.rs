//! Stored what-if runs of the pit-stop model.

use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

use super::pit_stop::simulate_pit_stop;
use super::{average_lap_time, pit_stop_loss};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    LapData, NewSimulation, RaceStatus, Simulation, SimulationRequest, TireCompound, User,
};
use crate::domain::ports::{DriverRepository, LapRepository, PitStopRepository, RaceRepository, SimulationRepository};

/// Seconds either side of the rejoin point within which another car counts as traffic.
const TRAFFIC_WINDOW: f64 = 1.5;

pub struct SimulationService {
    races: Arc<dyn RaceRepository>,
    drivers: Arc<dyn DriverRepository>,
    laps: Arc<dyn LapRepository>,
    pit_stops: Arc<dyn PitStopRepository>,
    simulations: Arc<dyn SimulationRepository>,
}

impl SimulationService {
    pub fn new(
        races: Arc<dyn RaceRepository>,
        drivers: Arc<dyn DriverRepository>,
        laps: Arc<dyn LapRepository>,
        pit_stops: Arc<dyn PitStopRepository>,
        simulations: Arc<dyn SimulationRepository>,
    ) -> Self {
        Self {
            races,
            drivers,
            laps,
            pit_stops,
            simulations,
        }
    }

    /// Run the pit-stop model for `user` and store the outcome.
    #[instrument(skip(self, user), fields(user_id = user.id))]
    pub async fn run(&self, user: &User, request: SimulationRequest) -> DomainResult<Simulation> {
        let compound = TireCompound::from_known(&request.alternative_tire_compound).ok_or_else(|| {
            DomainError::InvalidInput(format!(
                "unknown tire compound '{}'",
                request.alternative_tire_compound
            ))
        })?;

        let race = self
            .races
            .get(request.race_id)
            .await?
            .ok_or_else(|| DomainError::RaceNotFound(request.race_id.to_string()))?;
        self.drivers
            .get(request.driver_id)
            .await?
            .ok_or_else(|| DomainError::DriverNotFound(request.driver_id.to_string()))?;

        let started = Instant::now();
        let all_laps = self.laps.race_laps(race.id, None).await?;
        let laps: Vec<LapData> = all_laps
            .iter()
            .filter(|l| l.driver_id == request.driver_id)
            .cloned()
            .collect();
        let stops = self.pit_stops.driver_pit_stops(race.id, request.driver_id).await?;

        let outcome = simulate_pit_stop(
            race.id,
            request.driver_id,
            &laps,
            &stops,
            request.alternative_stop_lap,
            Some(compound),
        )?;

        let last_lap = laps.last();
        let actual_gap = last_lap.and_then(|l| l.gap_to_leader);
        let predicted_gap = (actual_gap.unwrap_or(0.0) + outcome.time_loss_at_stop - outcome.time_gain_after_stop).max(0.0);
        let predicted_gap = (predicted_gap * 1000.0).round() / 1000.0;

        let (actual_position, actual_gap) = if race.status == RaceStatus::Completed {
            (last_lap.map(|l| l.position), actual_gap)
        } else {
            (None, None)
        };

        let rejoin_gap = laps
            .iter()
            .find(|l| l.lap_number == request.alternative_stop_lap)
            .and_then(|l| l.gap_to_leader)
            .map(|gap| gap + pit_stop_loss(average_lap_time(&laps)));
        let traffic_affected = rejoin_gap.is_some_and(|rejoin| {
            all_laps.iter().any(|l| {
                l.driver_id != request.driver_id
                    && l.lap_number == request.alternative_stop_lap
                    && l.gap_to_leader.is_some_and(|gap| (gap - rejoin).abs() <= TRAFFIC_WINDOW)
            })
        });

        let simulation = NewSimulation {
            race_id: race.id,
            driver_id: request.driver_id,
            user_id: user.id,
            alternative_stop_lap: request.alternative_stop_lap,
            alternative_tire_compound: compound,
            predicted_position: outcome.alternative_position_final,
            predicted_gap,
            actual_position,
            actual_gap,
            position_delta: actual_position.map(|actual| outcome.alternative_position_final - actual),
            gap_delta: actual_gap.map(|actual| ((predicted_gap - actual) * 1000.0).round() / 1000.0),
            calculation_time_ms: i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX),
            traffic_affected,
            confidence_score: (outcome.confidence_score / 100.0).clamp(0.0, 1.0),
        };

        let stored = self.simulations.create(&simulation).await?;
        info!(
            simulation_id = stored.id,
            race_id = stored.race_id,
            driver_id = stored.driver_id,
            predicted_position = stored.predicted_position,
            "stored simulation"
        );
        Ok(stored)
    }

    pub async fn list_for_user(&self, user_id: i64, race_id: Option<i64>) -> DomainResult<Vec<Simulation>> {
        self.simulations.list_for_user(user_id, race_id).await
    }
}
