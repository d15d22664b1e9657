//! Driver, team and circuit lookups.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Circuit, Driver};
use crate::domain::ports::{CircuitRepository, DriverRepository, DEFAULT_SEARCH_LIMIT};

/// A constructor and its current drivers, derived from the drivers table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub drivers: Vec<Driver>,
}

pub struct DriverService {
    drivers: Arc<dyn DriverRepository>,
}

impl DriverService {
    pub fn new(drivers: Arc<dyn DriverRepository>) -> Self {
        Self { drivers }
    }

    /// All drivers, or those matching `search` when it is non-blank.
    pub async fn list_drivers(&self, search: Option<&str>, limit: Option<u32>) -> DomainResult<Vec<Driver>> {
        match search.map(str::trim).filter(|q| !q.is_empty()) {
            Some(query) => self.drivers.search(query, limit.unwrap_or(DEFAULT_SEARCH_LIMIT)).await,
            None => self.drivers.list(limit).await,
        }
    }

    pub async fn get_driver(&self, id: i64) -> DomainResult<Driver> {
        self.drivers
            .get(id)
            .await?
            .ok_or_else(|| DomainError::DriverNotFound(id.to_string()))
    }

    pub async fn get_by_code(&self, code: &str) -> DomainResult<Driver> {
        self.drivers
            .get_by_code(code)
            .await?
            .ok_or_else(|| DomainError::DriverNotFound(code.to_string()))
    }

    /// Teams in name order, each with its drivers by car number.
    pub async fn list_teams(&self) -> DomainResult<Vec<Team>> {
        let mut teams: BTreeMap<String, Vec<Driver>> = BTreeMap::new();
        for driver in self.drivers.list(None).await? {
            teams.entry(driver.team.clone()).or_default().push(driver);
        }
        Ok(teams
            .into_iter()
            .map(|(name, mut drivers)| {
                drivers.sort_by_key(|d| d.driver_number);
                Team { name, drivers }
            })
            .collect())
    }

    pub async fn get_team(&self, name: &str) -> DomainResult<Team> {
        let mut drivers = self.drivers.list_by_team(name.trim()).await?;
        if drivers.is_empty() {
            return Err(DomainError::TeamNotFound(name.to_string()));
        }
        drivers.sort_by_key(|d| d.driver_number);
        Ok(Team {
            name: drivers[0].team.clone(),
            drivers,
        })
    }
}

pub struct CircuitService {
    circuits: Arc<dyn CircuitRepository>,
}

impl CircuitService {
    pub fn new(circuits: Arc<dyn CircuitRepository>) -> Self {
        Self { circuits }
    }

    pub async fn list_circuits(&self, country: Option<&str>) -> DomainResult<Vec<Circuit>> {
        match country {
            Some(country) => self.circuits.list_by_country(country).await,
            None => self.circuits.list().await,
        }
    }

    pub async fn get_circuit(&self, id: i64) -> DomainResult<Circuit> {
        self.circuits
            .get(id)
            .await?
            .ok_or_else(|| DomainError::CircuitNotFound(id.to_string()))
    }
}
