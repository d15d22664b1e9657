//! Pit stop and race result models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::driver::Driver;
use super::lap::TireCompound;

/// A pit stop made by a driver during a race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitStop {
    pub id: i64,
    pub race_id: i64,
    pub driver_id: i64,
    pub stop_number: i64,
    /// Lap on which the driver entered the pit lane.
    pub lap: i64,
    pub duration_seconds: f64,
    pub tire_compound_before: Option<TireCompound>,
    pub tire_compound_after: TireCompound,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A derived pit stop ready to be written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPitStop {
    pub driver_id: i64,
    pub stop_number: i64,
    pub lap: i64,
    pub duration_seconds: f64,
    pub tire_compound_before: Option<TireCompound>,
    pub tire_compound_after: TireCompound,
}

/// Classification of a driver in a race (the `race_drivers` row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceResult {
    pub id: i64,
    pub race_id: i64,
    pub driver_id: i64,
    pub final_position: Option<i64>,
    pub grid_position: Option<i64>,
    /// "Finished", "+1 Lap", "+3 Laps", ...
    pub status: Option<String>,
}

/// A classification row with its driver resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultWithDriver {
    #[serde(flatten)]
    pub result: RaceResult,
    pub driver: Option<Driver>,
}

/// A derived classification ready to be written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRaceResult {
    pub driver_id: i64,
    pub final_position: Option<i64>,
    pub grid_position: Option<i64>,
    pub status: Option<String>,
}
