//! Race domain model.
//!
//! A race is one Grand Prix of a season. Its telemetry (laps, pit stops,
//! results) is attached once the ingestion pipeline has imported it, which is
//! tracked by `data_imported` / `imported_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::circuit::Circuit;

/// Lifecycle status of a race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

impl RaceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "scheduled" => Some(Self::Scheduled),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// A race of a season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Race {
    pub id: i64,
    pub season: i64,
    pub round: i64,
    pub name: String,
    pub circuit_id: i64,
    pub country: String,
    pub date: DateTime<Utc>,
    pub status: RaceStatus,
    pub data_imported: bool,
    pub imported_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A race joined with its circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceWithCircuit {
    #[serde(flatten)]
    pub race: Race,
    pub circuit: Option<Circuit>,
}

/// Fields required to insert a race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRace {
    pub season: i64,
    pub round: i64,
    pub name: String,
    pub circuit_id: i64,
    pub country: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub status: RaceStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [RaceStatus::Scheduled, RaceStatus::Completed, RaceStatus::Cancelled] {
            assert_eq!(RaceStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(RaceStatus::from_str("COMPLETED"), Some(RaceStatus::Completed));
        assert_eq!(RaceStatus::from_str("postponed"), None);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&RaceStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
    }
}
