//! Cached wrapper for DriverRepository using moka TTL cache.
//!
//! The ingestion pipeline resolves every driver code of a session and the API
//! resolves drivers for each result row, so `get` and `get_by_code` are
//! cached. `create` invalidates.

use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Driver, NewDriver};
use crate::domain::ports::DriverRepository;

/// Default TTL for cached drivers.
const DRIVER_CACHE_TTL_SECS: u64 = 300;

/// Maximum number of cached entries per lookup.
const DRIVER_CACHE_MAX_CAPACITY: u64 = 256;

/// Cached driver repository decorator.
///
/// Only hits are cached; a missing driver is looked up again next time.
pub struct CachedDriverRepository<D: DriverRepository> {
    inner: Arc<D>,
    by_id: Cache<i64, Arc<Driver>>,
    /// Keyed by upper-case code.
    by_code: Cache<String, Arc<Driver>>,
}

impl<D: DriverRepository> CachedDriverRepository<D> {
    pub fn new(inner: Arc<D>) -> Self {
        Self::with_ttl(inner, Duration::from_secs(DRIVER_CACHE_TTL_SECS))
    }

    pub fn with_ttl(inner: Arc<D>, ttl: Duration) -> Self {
        let by_id = Cache::builder()
            .max_capacity(DRIVER_CACHE_MAX_CAPACITY)
            .time_to_live(ttl)
            .build();
        let by_code = Cache::builder()
            .max_capacity(DRIVER_CACHE_MAX_CAPACITY)
            .time_to_live(ttl)
            .build();

        Self { inner, by_id, by_code }
    }

    fn invalidate_all(&self) {
        self.by_id.invalidate_all();
        self.by_code.invalidate_all();
    }

    async fn remember(&self, driver: &Driver) {
        let shared = Arc::new(driver.clone());
        self.by_id.insert(driver.id, shared.clone()).await;
        self.by_code.insert(driver.code.clone(), shared).await;
    }
}

#[async_trait]
impl<D: DriverRepository + 'static> DriverRepository for CachedDriverRepository<D> {
    async fn create(&self, driver: &NewDriver) -> DomainResult<Driver> {
        let result = self.inner.create(driver).await;
        if result.is_ok() {
            self.invalidate_all();
        }
        result
    }

    async fn get(&self, id: i64) -> DomainResult<Option<Driver>> {
        if let Some(cached) = self.by_id.get(&id).await {
            return Ok(Some((*cached).clone()));
        }

        let result = self.inner.get(id).await?;
        if let Some(ref driver) = result {
            self.remember(driver).await;
        }
        Ok(result)
    }

    async fn get_by_number(&self, number: i64) -> DomainResult<Option<Driver>> {
        self.inner.get_by_number(number).await
    }

    async fn get_by_code(&self, code: &str) -> DomainResult<Option<Driver>> {
        let code = code.trim().to_uppercase();
        if let Some(cached) = self.by_code.get(&code).await {
            return Ok(Some((*cached).clone()));
        }

        let result = self.inner.get_by_code(&code).await?;
        if let Some(ref driver) = result {
            self.remember(driver).await;
        }
        Ok(result)
    }

    async fn list(&self, limit: Option<u32>) -> DomainResult<Vec<Driver>> {
        self.inner.list(limit).await
    }

    async fn list_by_team(&self, team: &str) -> DomainResult<Vec<Driver>> {
        self.inner.list_by_team(team).await
    }

    async fn search(&self, query: &str, limit: u32) -> DomainResult<Vec<Driver>> {
        self.inner.search(query, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteDriverRepository};

    async fn setup() -> (sqlx::SqlitePool, CachedDriverRepository<SqliteDriverRepository>) {
        let pool = create_migrated_test_pool().await.unwrap();
        let inner = Arc::new(SqliteDriverRepository::new(pool.clone()));
        (pool, CachedDriverRepository::new(inner))
    }

    #[tokio::test]
    async fn test_cache_hit_after_first_lookup() {
        let (pool, repo) = setup().await;
        let created = repo
            .create(&NewDriver::new(1, "VER", "Max", "Verstappen", "Red Bull Racing"))
            .await
            .unwrap();

        assert_eq!(repo.get_by_code("ver").await.unwrap().unwrap().id, created.id);

        // A row changed behind the cache's back is still served from cache.
        sqlx::query("UPDATE drivers SET team = 'Other' WHERE id = ?")
            .bind(created.id)
            .execute(&pool)
            .await
            .unwrap();
        assert_eq!(repo.get(created.id).await.unwrap().unwrap().team, "Red Bull Racing");
        assert_eq!(repo.get_by_code("VER").await.unwrap().unwrap().team, "Red Bull Racing");
    }

    #[tokio::test]
    async fn test_create_invalidates() {
        let (pool, repo) = setup().await;
        let created = repo
            .create(&NewDriver::new(1, "VER", "Max", "Verstappen", "Red Bull Racing"))
            .await
            .unwrap();
        repo.get(created.id).await.unwrap();

        sqlx::query("UPDATE drivers SET team = 'Other' WHERE id = ?")
            .bind(created.id)
            .execute(&pool)
            .await
            .unwrap();
        repo.create(&NewDriver::new(16, "LEC", "Charles", "Leclerc", "Ferrari"))
            .await
            .unwrap();

        assert_eq!(repo.get(created.id).await.unwrap().unwrap().team, "Other");
    }

    #[tokio::test]
    async fn test_misses_are_not_cached() {
        let (_pool, repo) = setup().await;
        assert!(repo.get_by_code("NOR").await.unwrap().is_none());

        repo.create(&NewDriver::new(4, "NOR", "Lando", "Norris", "McLaren"))
            .await
            .unwrap();
        assert!(repo.get_by_code("NOR").await.unwrap().is_some());
    }
}
