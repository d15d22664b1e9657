//! Driver domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Formula 1 driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: i64,
    /// Permanent car number, unique across drivers.
    pub driver_number: i64,
    /// Three-letter code, always upper-case.
    pub code: String,
    pub first_name: String,
    pub last_name: String,
    pub team: String,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Driver {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Fields required to insert a driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDriver {
    pub driver_number: i64,
    pub code: String,
    pub first_name: String,
    pub last_name: String,
    pub team: String,
    #[serde(default)]
    pub country: Option<String>,
}

impl NewDriver {
    pub fn new(
        driver_number: i64,
        code: &str,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        team: impl Into<String>,
    ) -> Self {
        Self {
            driver_number,
            code: code.to_uppercase(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            team: team.into(),
            country: None,
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Check the invariants the schema relies on.
    pub fn validate(&self) -> Result<(), String> {
        if self.code.len() != 3 || !self.code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(format!("driver code must be three letters, got '{}'", self.code));
        }
        if self.code != self.code.to_uppercase() {
            return Err(format!("driver code must be upper-case, got '{}'", self.code));
        }
        if self.driver_number < 0 {
            return Err(format!("driver number must not be negative, got {}", self.driver_number));
        }
        Ok(())
    }
}
