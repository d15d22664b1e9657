//! Circuit domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Formula 1 circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    pub id: i64,
    pub name: String,
    pub country: String,
    pub length_km: f64,
    pub turns: i64,
    /// Track map data (JSON or base64), when known.
    pub track_map_data: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields required to insert a circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCircuit {
    pub name: String,
    pub country: String,
    pub length_km: f64,
    pub turns: i64,
    #[serde(default)]
    pub track_map_data: Option<String>,
}

impl NewCircuit {
    pub fn new(name: impl Into<String>, country: impl Into<String>, length_km: f64, turns: i64) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
            length_km,
            turns,
            track_map_data: None,
        }
    }
}
