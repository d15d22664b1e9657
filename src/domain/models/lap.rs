//! Lap timing domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tire compound fitted for a lap.
///
/// The provider occasionally reports compounds we do not model (test
/// compounds, missing values); those map to `Unknown` rather than failing the
/// import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TireCompound {
    Soft,
    Medium,
    Hard,
    Intermediate,
    Wet,
    #[default]
    Unknown,
}

impl TireCompound {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Soft => "SOFT",
            Self::Medium => "MEDIUM",
            Self::Hard => "HARD",
            Self::Intermediate => "INTERMEDIATE",
            Self::Wet => "WET",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Lenient parse used for provider data and stored rows.
    pub fn parse(s: &str) -> Self {
        Self::from_known(s).unwrap_or(Self::Unknown)
    }

    /// Strict parse used for user input: only the five racing compounds.
    pub fn from_known(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "SOFT" => Some(Self::Soft),
            "MEDIUM" => Some(Self::Medium),
            "HARD" => Some(Self::Hard),
            "INTERMEDIATE" => Some(Self::Intermediate),
            "WET" => Some(Self::Wet),
            _ => None,
        }
    }

    /// Slick compounds are the dry-weather tires.
    pub fn is_slick(&self) -> bool {
        matches!(self, Self::Soft | Self::Medium | Self::Hard)
    }
}

impl fmt::Display for TireCompound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sector split times in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SectorTimes {
    pub sector1: f64,
    pub sector2: f64,
    pub sector3: f64,
}

impl SectorTimes {
    pub fn total(&self) -> f64 {
        self.sector1 + self.sector2 + self.sector3
    }
}

/// One lap of one driver in one race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapData {
    pub id: i64,
    pub race_id: i64,
    pub driver_id: i64,
    pub lap_number: i64,
    /// Position at the end of the lap.
    pub position: i64,
    pub lap_time_seconds: f64,
    pub sector_times: SectorTimes,
    pub tire_compound: TireCompound,
    /// Laps driven on the current set of tires.
    pub tire_age: i64,
    pub gap_to_leader: Option<f64>,
    pub gap_to_ahead: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A normalized lap ready to be written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLap {
    pub driver_id: i64,
    pub lap_number: i64,
    pub position: i64,
    pub lap_time_seconds: f64,
    pub sector_times: SectorTimes,
    pub tire_compound: TireCompound,
    pub tire_age: i64,
    pub gap_to_leader: Option<f64>,
    pub gap_to_ahead: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compound_parse_is_lenient() {
        assert_eq!(TireCompound::parse("soft"), TireCompound::Soft);
        assert_eq!(TireCompound::parse(" Intermediate "), TireCompound::Intermediate);
        assert_eq!(TireCompound::parse("TEST_UNKNOWN"), TireCompound::Unknown);
        assert_eq!(TireCompound::parse(""), TireCompound::Unknown);
    }

    #[test]
    fn test_compound_from_known_is_strict() {
        assert_eq!(TireCompound::from_known("hard"), Some(TireCompound::Hard));
        assert_eq!(TireCompound::from_known("UNKNOWN"), None);
    }

    #[test]
    fn test_compound_serializes_uppercase() {
        let json = serde_json::to_string(&TireCompound::Medium).unwrap();
        assert_eq!(json, "\"MEDIUM\"");
        let parsed: TireCompound = serde_json::from_str("\"WET\"").unwrap();
        assert_eq!(parsed, TireCompound::Wet);
    }

    #[test]
    fn test_sector_total() {
        let sectors = SectorTimes { sector1: 30.1, sector2: 40.2, sector3: 25.3 };
        assert!((sectors.total() - 95.6).abs() < 1e-9);
    }
}
