//! Remote session cache tier backed by Redis.
//!
//! The connection is opened on first use. When Redis cannot be reached the
//! tier switches itself off for a cool-down window and reports misses.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::Client;
use std::time::{Duration, Instant};
use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, warn};

use crate::domain::models::SessionTelemetry;
use crate::domain::ports::SessionCache;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, thiserror::Error)]
enum RedisCacheError {
    #[error("redis: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("connection timed out after {0:?}")]
    Timeout(Duration),
    #[error("codec: {0}")]
    Codec(String),
}

pub struct RedisSessionCache {
    client: Client,
    connection: OnceCell<ConnectionManager>,
    ttl: Duration,
    retry_after: Duration,
    disabled_until: RwLock<Option<Instant>>,
}

impl RedisSessionCache {
    /// Parse the URL; no connection is made until the first lookup.
    pub fn new(redis_url: &str, ttl: Duration, retry_after: Duration) -> Result<Self, redis::RedisError> {
        Ok(Self {
            client: Client::open(redis_url)?,
            connection: OnceCell::new(),
            ttl,
            retry_after,
            disabled_until: RwLock::new(None),
        })
    }

    async fn is_disabled(&self) -> bool {
        matches!(*self.disabled_until.read().await, Some(until) if Instant::now() < until)
    }

    async fn disable(&self, err: &RedisCacheError) {
        warn!(error = %err, retry_after_secs = self.retry_after.as_secs(), "redis cache unavailable, disabling tier");
        *self.disabled_until.write().await = Some(Instant::now() + self.retry_after);
    }

    async fn connection(&self) -> Result<ConnectionManager, RedisCacheError> {
        let manager = self
            .connection
            .get_or_try_init(|| async {
                let mut manager = tokio::time::timeout(CONNECT_TIMEOUT, ConnectionManager::new(self.client.clone()))
                    .await
                    .map_err(|_| RedisCacheError::Timeout(CONNECT_TIMEOUT))??;
                let pong: String = redis::cmd("PING").query_async(&mut manager).await?;
                debug!(reply = %pong, "connected to redis");
                Ok::<_, RedisCacheError>(manager)
            })
            .await?;
        Ok(manager.clone())
    }

    async fn try_get(&self, key: &str) -> Result<Option<SessionTelemetry>, RedisCacheError> {
        let mut conn = self.connection().await?;
        let bytes: Option<Vec<u8>> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;
        let Some(bytes) = bytes else {
            return Ok(None);
        };

        let telemetry = tokio::task::spawn_blocking(move || serde_json::from_slice::<SessionTelemetry>(&bytes))
            .await
            .map_err(|e| RedisCacheError::Codec(e.to_string()))?
            .map_err(|e| RedisCacheError::Codec(e.to_string()))?;
        Ok(Some(telemetry))
    }

    async fn try_put(&self, key: &str, telemetry: &SessionTelemetry) -> Result<(), RedisCacheError> {
        let mut conn = self.connection().await?;
        let owned = telemetry.clone();
        let bytes = tokio::task::spawn_blocking(move || serde_json::to_vec(&owned))
            .await
            .map_err(|e| RedisCacheError::Codec(e.to_string()))?
            .map_err(|e| RedisCacheError::Codec(e.to_string()))?;

        let _: () = redis::cmd("SETEX")
            .arg(key)
            .arg(self.ttl.as_secs().max(1))
            .arg(bytes)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SessionCache for RedisSessionCache {
    async fn get(&self, key: &str) -> Option<SessionTelemetry> {
        if self.is_disabled().await {
            return None;
        }
        match self.try_get(key).await {
            Ok(hit) => hit,
            Err(RedisCacheError::Codec(e)) => {
                warn!(key, error = %e, "discarding unreadable redis entry");
                None
            }
            Err(e) => {
                self.disable(&e).await;
                None
            }
        }
    }

    async fn put(&self, key: &str, telemetry: &SessionTelemetry) {
        if self.is_disabled().await {
            return;
        }
        match self.try_put(key, telemetry).await {
            Ok(()) => debug!(key, "stored session in redis"),
            Err(RedisCacheError::Codec(e)) => warn!(key, error = %e, "could not encode session for redis"),
            Err(e) => self.disable(&e).await,
        }
    }

    fn tier(&self) -> &'static str {
        "redis"
    }
}
