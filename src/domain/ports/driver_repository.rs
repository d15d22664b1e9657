//! Driver repository port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Driver, NewDriver};

pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Repository interface for drivers.
#[async_trait]
pub trait DriverRepository: Send + Sync {
    async fn create(&self, driver: &NewDriver) -> DomainResult<Driver>;

    async fn get(&self, id: i64) -> DomainResult<Option<Driver>>;

    async fn get_by_number(&self, number: i64) -> DomainResult<Option<Driver>>;

    /// Case-insensitive lookup by three-letter code.
    async fn get_by_code(&self, code: &str) -> DomainResult<Option<Driver>>;

    /// Drivers ordered by number.
    async fn list(&self, limit: Option<u32>) -> DomainResult<Vec<Driver>>;

    async fn list_by_team(&self, team: &str) -> DomainResult<Vec<Driver>>;

    /// Case-insensitive substring search on first name, last name and code.
    async fn search(&self, query: &str, limit: u32) -> DomainResult<Vec<Driver>>;
}
