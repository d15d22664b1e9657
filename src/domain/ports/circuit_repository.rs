//! Circuit repository port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Circuit, NewCircuit};

/// Repository interface for circuits.
#[async_trait]
pub trait CircuitRepository: Send + Sync {
    /// Insert a circuit and return it with its assigned id.
    async fn create(&self, circuit: &NewCircuit) -> DomainResult<Circuit>;

    async fn get(&self, id: i64) -> DomainResult<Option<Circuit>>;

    async fn get_by_name(&self, name: &str) -> DomainResult<Option<Circuit>>;

    /// All circuits ordered by name.
    async fn list(&self) -> DomainResult<Vec<Circuit>>;

    async fn list_by_country(&self, country: &str) -> DomainResult<Vec<Circuit>>;
}
