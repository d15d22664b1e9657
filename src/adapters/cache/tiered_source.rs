//! Read-through cache in front of a [`TimingSource`].
//!
//! Tiers are consulted in order (remote first, then disk). A hit in a lower
//! tier back-fills every tier above it; a full miss goes to the inner source
//! and the result is written to all tiers.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::{DiskSessionCache, RedisSessionCache};
use crate::domain::errors::DomainResult;
use crate::domain::models::{CacheConfig, SessionKey, SessionTelemetry};
use crate::domain::ports::{SessionCache, TimingSource};

pub struct TieredTimingSource<S: TimingSource> {
    inner: Arc<S>,
    tiers: Vec<Arc<dyn SessionCache>>,
}

impl<S: TimingSource> TieredTimingSource<S> {
    pub fn new(inner: Arc<S>, tiers: Vec<Arc<dyn SessionCache>>) -> Self {
        Self { inner, tiers }
    }

    /// Build the tiers described by `config` around `inner`.
    pub fn from_config(inner: Arc<S>, config: &CacheConfig) -> Self {
        Self::new(inner, tiers_from_config(config))
    }

    pub fn tier_names(&self) -> Vec<&'static str> {
        self.tiers.iter().map(|t| t.tier()).collect()
    }

    async fn back_fill(&self, upto: usize, key: &str, telemetry: &SessionTelemetry) {
        for tier in &self.tiers[..upto] {
            tier.put(key, telemetry).await;
        }
    }
}

/// Remote tier (when a Redis URL is configured) followed by the disk tier.
/// An empty list when caching is disabled.
pub fn tiers_from_config(config: &CacheConfig) -> Vec<Arc<dyn SessionCache>> {
    let mut tiers: Vec<Arc<dyn SessionCache>> = Vec::new();
    if !config.enabled {
        return tiers;
    }

    if let Some(url) = config.redis_url.as_deref().filter(|u| !u.trim().is_empty()) {
        match RedisSessionCache::new(
            url,
            Duration::from_secs(config.redis_ttl_secs),
            Duration::from_secs(config.redis_retry_after_secs),
        ) {
            Ok(cache) => tiers.push(Arc::new(cache)),
            Err(e) => warn!(error = %e, "invalid redis url, remote cache tier disabled"),
        }
    }

    tiers.push(Arc::new(DiskSessionCache::new(
        &config.disk_dir,
        Duration::from_secs(config.disk_ttl_secs),
    )));
    tiers
}

#[async_trait]
impl<S: TimingSource + 'static> TimingSource for TieredTimingSource<S> {
    async fn load_session(&self, key: &SessionKey) -> DomainResult<SessionTelemetry> {
        Ok(self.load_session_with_origin(key).await?.0)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }

    #[instrument(skip(self), fields(season = key.season, event = %key.event_name, session = %key.session))]
    async fn load_session_with_origin(&self, key: &SessionKey) -> DomainResult<(SessionTelemetry, &'static str)> {
        let cache_key = key.cache_key();

        for (index, tier) in self.tiers.iter().enumerate() {
            match tier.get(&cache_key).await {
                Some(telemetry) if !telemetry.is_empty() => {
                    info!(tier = tier.tier(), laps = telemetry.laps.len(), "session cache hit");
                    self.back_fill(index, &cache_key, &telemetry).await;
                    return Ok((telemetry, tier.tier()));
                }
                Some(_) => debug!(tier = tier.tier(), "ignoring empty cached session"),
                None => debug!(tier = tier.tier(), "session cache miss"),
            }
        }

        let telemetry = self.inner.load_session(key).await?;
        self.back_fill(self.tiers.len(), &cache_key, &telemetry).await;
        Ok((telemetry, self.inner.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::DomainError;
    use crate::domain::models::{DriverEntry, RawLap};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct MemoryCache {
        name: &'static str,
        entries: Mutex<HashMap<String, SessionTelemetry>>,
        puts: AtomicUsize,
    }

    impl MemoryCache {
        fn named(name: &'static str) -> Arc<Self> {
            Arc::new(Self { name, ..Default::default() })
        }
    }

    #[async_trait]
    impl SessionCache for MemoryCache {
        async fn get(&self, key: &str) -> Option<SessionTelemetry> {
            self.entries.lock().await.get(key).cloned()
        }

        async fn put(&self, key: &str, telemetry: &SessionTelemetry) {
            self.puts.fetch_add(1, Ordering::SeqCst);
            self.entries.lock().await.insert(key.to_string(), telemetry.clone());
        }

        fn tier(&self) -> &'static str {
            self.name
        }
    }

    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl TimingSource for CountingSource {
        async fn load_session(&self, key: &SessionKey) -> DomainResult<SessionTelemetry> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DomainError::TimingUnavailable("offline".to_string()));
            }
            Ok(sample(key))
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    fn sample(key: &SessionKey) -> SessionTelemetry {
        SessionTelemetry {
            key: key.clone(),
            drivers: vec![DriverEntry::from_code("VER")],
            laps: vec![RawLap {
                driver_code: "VER".to_string(),
                lap_number: 1,
                lap_time: Some(96.0),
                ..Default::default()
            }],
        }
    }

    fn key() -> SessionKey {
        SessionKey::race(2024, "Bahrain Grand Prix")
    }

    #[tokio::test]
    async fn test_miss_fetches_and_fills_all_tiers() {
        let inner = Arc::new(CountingSource::default());
        let remote = MemoryCache::named("remote");
        let disk = MemoryCache::named("disk");
        let source = TieredTimingSource::new(inner.clone(), vec![remote.clone() as Arc<dyn SessionCache>, disk.clone()]);

        let (telemetry, origin) = source.load_session_with_origin(&key()).await.unwrap();
        assert_eq!(origin, "counting");
        assert_eq!(telemetry.laps.len(), 1);
        assert_eq!(remote.puts.load(Ordering::SeqCst), 1);
        assert_eq!(disk.puts.load(Ordering::SeqCst), 1);

        let (_, origin) = source.load_session_with_origin(&key()).await.unwrap();
        assert_eq!(origin, "remote");
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_lower_tier_hit_back_fills_upper_tier() {
        let inner = Arc::new(CountingSource::default());
        let remote = MemoryCache::named("remote");
        let disk = MemoryCache::named("disk");
        disk.put(&key().cache_key(), &sample(&key())).await;

        let source = TieredTimingSource::new(inner.clone(), vec![remote.clone() as Arc<dyn SessionCache>, disk.clone()]);
        let (_, origin) = source.load_session_with_origin(&key()).await.unwrap();

        assert_eq!(origin, "disk");
        assert_eq!(inner.calls.load(Ordering::SeqCst), 0);
        assert!(remote.get(&key().cache_key()).await.is_some());
        assert_eq!(disk.puts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_inner_failure_propagates_and_caches_nothing() {
        let inner = Arc::new(CountingSource { fail: true, ..Default::default() });
        let disk = MemoryCache::named("disk");
        let source = TieredTimingSource::new(inner, vec![disk.clone() as Arc<dyn SessionCache>]);

        let result = source.load_session(&key()).await;
        assert!(matches!(result, Err(DomainError::TimingUnavailable(_))));
        assert_eq!(disk.puts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_without_tiers_is_a_passthrough() {
        let inner = Arc::new(CountingSource::default());
        let source = TieredTimingSource::new(inner.clone(), Vec::new());

        source.load_session(&key()).await.unwrap();
        source.load_session(&key()).await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_tiers_from_config() {
        let mut config = CacheConfig::default();
        let tiers = tiers_from_config(&config);
        assert_eq!(tiers.iter().map(|t| t.tier()).collect::<Vec<_>>(), vec!["disk"]);

        config.redis_url = Some("redis://127.0.0.1:6379".to_string());
        let tiers = tiers_from_config(&config);
        assert_eq!(tiers.iter().map(|t| t.tier()).collect::<Vec<_>>(), vec!["redis", "disk"]);

        config.enabled = false;
        assert!(tiers_from_config(&config).is_empty());
    }
}
