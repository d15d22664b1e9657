//! Simulation repository port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{NewSimulation, Simulation};

#[async_trait]
pub trait SimulationRepository: Send + Sync {
    async fn create(&self, simulation: &NewSimulation) -> DomainResult<Simulation>;

    async fn get(&self, id: i64) -> DomainResult<Option<Simulation>>;

    /// Simulations of a user, newest first.
    async fn list_for_user(&self, user_id: i64, race_id: Option<i64>) -> DomainResult<Vec<Simulation>>;

    async fn list_for_race(&self, race_id: i64, driver_id: Option<i64>) -> DomainResult<Vec<Simulation>>;
}
