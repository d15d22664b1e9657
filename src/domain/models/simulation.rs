//! Persisted strategy simulations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lap::TireCompound;

/// The outcome of a what-if pit strategy run by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Simulation {
    pub id: i64,
    pub race_id: i64,
    pub driver_id: i64,
    pub user_id: i64,
    pub alternative_stop_lap: i64,
    pub alternative_tire_compound: TireCompound,
    pub predicted_position: i64,
    /// Predicted gap to the leader, in seconds.
    pub predicted_gap: f64,
    pub actual_position: Option<i64>,
    pub actual_gap: Option<f64>,
    pub position_delta: Option<i64>,
    pub gap_delta: Option<f64>,
    pub calculation_time_ms: i64,
    pub traffic_affected: bool,
    /// Confidence in `[0, 1]`.
    pub confidence_score: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A simulation ready to be stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSimulation {
    pub race_id: i64,
    pub driver_id: i64,
    pub user_id: i64,
    pub alternative_stop_lap: i64,
    pub alternative_tire_compound: TireCompound,
    pub predicted_position: i64,
    pub predicted_gap: f64,
    pub actual_position: Option<i64>,
    pub actual_gap: Option<f64>,
    pub position_delta: Option<i64>,
    pub gap_delta: Option<f64>,
    pub calculation_time_ms: i64,
    pub traffic_affected: bool,
    pub confidence_score: f64,
}

/// Request body for running and storing a simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub race_id: i64,
    pub driver_id: i64,
    pub alternative_stop_lap: i64,
    pub alternative_tire_compound: String,
}
