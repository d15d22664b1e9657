//! Local session cache tier: one JSON file per key.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::models::SessionTelemetry;
use crate::domain::ports::SessionCache;

#[derive(Serialize, Deserialize)]
struct Envelope {
    stored_at: DateTime<Utc>,
    payload: SessionTelemetry,
}

/// File-backed cache. All file I/O and (de)serialization runs on the
/// blocking thread pool.
#[derive(Clone)]
pub struct DiskSessionCache {
    dir: PathBuf,
    ttl: Duration,
}

impl DiskSessionCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self { dir: dir.into(), ttl }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for a key: readable characters kept, the rest replaced,
    /// plus a hash of the raw key so distinct keys never share a file.
    /// The hash must not change between builds or existing files are orphaned.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let readable: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{readable}-{:016x}.json", fnv1a_64(key.as_bytes())))
    }
}

/// 64-bit FNV-1a.
fn fnv1a_64(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    bytes
        .iter()
        .fold(OFFSET_BASIS, |hash, &b| (hash ^ u64::from(b)).wrapping_mul(PRIME))
}

enum Lookup {
    Hit(SessionTelemetry),
    Miss,
    Expired,
}

fn read_entry(path: &Path, ttl: Duration) -> io::Result<Lookup> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Lookup::Miss),
        Err(e) => return Err(e),
    };
    let envelope: Envelope = serde_json::from_slice(&bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let age = Utc::now().signed_duration_since(envelope.stored_at);
    let expired = age.to_std().map(|age| age > ttl).unwrap_or(false);
    if expired {
        std::fs::remove_file(path)?;
        return Ok(Lookup::Expired);
    }
    Ok(Lookup::Hit(envelope.payload))
}

fn write_entry(dir: &Path, path: &Path, payload: SessionTelemetry) -> io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let envelope = Envelope { stored_at: Utc::now(), payload };
    let bytes = serde_json::to_vec(&envelope).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    // Write then rename so readers never see a partial file.
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)
}

#[async_trait]
impl SessionCache for DiskSessionCache {
    async fn get(&self, key: &str) -> Option<SessionTelemetry> {
        let path = self.path_for(key);
        let ttl = self.ttl;
        let result = tokio::task::spawn_blocking(move || read_entry(&path, ttl)).await;

        match result {
            Ok(Ok(Lookup::Hit(telemetry))) => Some(telemetry),
            Ok(Ok(Lookup::Miss)) => None,
            Ok(Ok(Lookup::Expired)) => {
                debug!(key, "disk cache entry expired");
                None
            }
            Ok(Err(e)) => {
                warn!(key, error = %e, "disk cache read failed");
                None
            }
            Err(e) => {
                warn!(key, error = %e, "disk cache task failed");
                None
            }
        }
    }

    async fn put(&self, key: &str, telemetry: &SessionTelemetry) {
        let dir = self.dir.clone();
        let path = self.path_for(key);
        let payload = telemetry.clone();
        let result = tokio::task::spawn_blocking(move || write_entry(&dir, &path, payload)).await;

        match result {
            Ok(Ok(())) => debug!(key, "stored session in disk cache"),
            Ok(Err(e)) => warn!(key, error = %e, "disk cache write failed"),
            Err(e) => warn!(key, error = %e, "disk cache task failed"),
        }
    }

    fn tier(&self) -> &'static str {
        "disk"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{DriverEntry, RawLap, SessionKey};

    fn telemetry() -> SessionTelemetry {
        SessionTelemetry {
            key: SessionKey::race(2024, "Bahrain Grand Prix"),
            drivers: vec![DriverEntry::from_code("VER")],
            laps: vec![RawLap {
                driver_code: "VER".to_string(),
                lap_number: 1,
                lap_time: Some(97.284),
                ..Default::default()
            }],
        }
    }

    #[test]
    fn test_file_names_are_stable() {
        assert_eq!(fnv1a_64(b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a_64(b"a"), 0xaf63_dc4c_8601_ec8c);

        let cache = DiskSessionCache::new("/var/cache/pitline", Duration::from_secs(60));
        assert_eq!(
            cache.path_for("timing:session:2024:Bahrain Grand Prix:R"),
            PathBuf::from("/var/cache/pitline/timing_session_2024_Bahrain_Grand_Prix_R-2509332fb515d5e3.json")
        );

        let a = cache.path_for("timing:session:2024:São Paulo Grand Prix:R");
        let b = cache.path_for("timing:session:2024:S_o Paulo Grand Prix:R");
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskSessionCache::new(dir.path().join("cache"), Duration::from_secs(3600));
        let key = telemetry().key.cache_key();

        assert!(cache.get(&key).await.is_none());
        cache.put(&key, &telemetry()).await;

        let hit = cache.get(&key).await.unwrap();
        assert_eq!(hit, telemetry());
    }

    #[tokio::test]
    async fn test_expired_entry_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskSessionCache::new(dir.path(), Duration::from_secs(60));
        let key = "timing:session:2024:Bahrain Grand Prix:Race";

        let stale = Envelope {
            stored_at: Utc::now() - chrono::Duration::hours(2),
            payload: telemetry(),
        };
        std::fs::write(cache.path_for(key), serde_json::to_vec(&stale).unwrap()).unwrap();

        assert!(cache.get(key).await.is_none());
        assert!(!cache.path_for(key).exists());
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskSessionCache::new(dir.path(), Duration::from_secs(60));
        std::fs::write(cache.path_for("k"), b"{not json").unwrap();

        assert!(cache.get("k").await.is_none());
    }

    #[test]
    fn test_path_for_sanitizes_and_disambiguates() {
        let cache = DiskSessionCache::new("/tmp/pitline", Duration::from_secs(60));
        let a = cache.path_for("timing:session:2024:São Paulo Grand Prix:Race");
        let b = cache.path_for("timing:session:2024:S_o Paulo Grand Prix:Race");

        let name = a.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("timing_session_2024_S_o_Paulo_Grand_Prix_Race-"));
        assert_ne!(a, b);
    }
}
