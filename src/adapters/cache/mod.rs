//! Caching layers.
//!
//! - Session telemetry: a remote Redis tier and a local disk tier behind
//!   [`TieredTimingSource`], a read-through decorator over any timing source.
//! - Hot-path repository reads: `moka` TTL caches wrapped around repository
//!   traits as decorators, invalidated on writes.

pub mod cached_driver_repository;
pub mod disk_cache;
pub mod redis_cache;
pub mod tiered_source;

pub use cached_driver_repository::CachedDriverRepository;
pub use disk_cache::DiskSessionCache;
pub use redis_cache::RedisSessionCache;
pub use tiered_source::{tiers_from_config, TieredTimingSource};
