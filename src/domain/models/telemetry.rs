//! Provider-neutral session telemetry.
//!
//! A [`SessionTelemetry`] is what a timing source hands back for one session:
//! the driver list and every raw lap as reported, with gaps in the data kept
//! as `None`. Normalization into stored rows happens in the ingestion service
//! and produces a [`NormalizedRace`].

use serde::{Deserialize, Serialize};

use super::lap::NewLap;
use super::pit_stop::{NewPitStop, NewRaceResult};

pub const DEFAULT_SESSION: &str = "Race";

/// Identifies one session of one event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub season: i64,
    /// Event name as used by the provider, e.g. "Bahrain Grand Prix".
    pub event_name: String,
    pub session: String,
}

impl SessionKey {
    /// Key for the race session of an event.
    pub fn race(season: i64, event_name: impl Into<String>) -> Self {
        Self {
            season,
            event_name: event_name.into(),
            session: DEFAULT_SESSION.to_string(),
        }
    }

    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = session.into();
        self
    }

    /// Key used by the cache tiers.
    pub fn cache_key(&self) -> String {
        format!(
            "timing:session:{}:{}:{}",
            self.season, self.event_name, self.session
        )
    }
}

/// A driver as listed by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverEntry {
    pub code: String,
    pub number: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub team: Option<String>,
}

impl DriverEntry {
    pub fn from_code(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            number: None,
            first_name: None,
            last_name: None,
            team: None,
        }
    }
}

/// One lap as reported by the provider. Times are seconds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawLap {
    pub driver_code: String,
    pub lap_number: i64,
    pub position: Option<i64>,
    pub lap_time: Option<f64>,
    pub sector1: Option<f64>,
    pub sector2: Option<f64>,
    pub sector3: Option<f64>,
    pub compound: Option<String>,
    pub tyre_life: Option<i64>,
    pub stint: Option<i64>,
    /// Session time at pit entry, set on in-laps.
    pub pit_in_time: Option<f64>,
    /// Session time at pit exit, set on out-laps.
    pub pit_out_time: Option<f64>,
}

/// Everything a timing source returns for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionTelemetry {
    pub key: SessionKey,
    pub drivers: Vec<DriverEntry>,
    pub laps: Vec<RawLap>,
}

impl SessionTelemetry {
    pub fn is_empty(&self) -> bool {
        self.laps.is_empty()
    }
}

/// Normalized rows for one race, keyed by database driver id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedRace {
    pub laps: Vec<NewLap>,
    pub pit_stops: Vec<NewPitStop>,
    pub results: Vec<NewRaceResult>,
}
