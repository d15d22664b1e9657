use serde::{Deserialize, Serialize};

/// Per-year summary derived from the races table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub year: i64,
    pub total_races: i64,
    pub completed_races: i64,
}
