use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;
use url::Url;

use crate::domain::models::config::Config;

/// Project-local configuration directory.
pub const CONFIG_DIR: &str = ".pitline";

/// Prefix of environment overrides; nested keys use `__`, e.g. `PITLINE_SERVER__PORT`.
pub const ENV_PREFIX: &str = "PITLINE_";

const MIN_SECRET_KEY_LENGTH: usize = 16;
/// One year.
const MAX_TOKEN_EXPIRY_MINUTES: i64 = 525_600;
const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const VALID_LOG_FORMATS: [&str; 2] = ["json", "pretty"];
const VALID_ROTATIONS: [&str; 3] = ["daily", "hourly", "never"];

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Invalid rate limit: {0}. Must be positive")]
    InvalidRateLimit(f64),

    #[error("Invalid burst_size: {0}. Must be at least 1")]
    InvalidBurstSize(u32),

    #[error("Invalid max_concurrent_downloads: {0}. Must be at least 1")]
    InvalidConcurrency(usize),

    #[error("Invalid timeout_secs: {0}. Must be at least 1")]
    InvalidTimeout(u64),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must be less than max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Secret key must be at least 16 characters")]
    WeakSecretKey,

    #[error("Invalid access_token_expire_minutes: {0}. Must be between 1 and 525600 (one year)")]
    InvalidTokenExpiry(i64),

    #[error("Invalid cache TTL for {0}: must be at least 1 second")]
    InvalidCacheTtl(&'static str),

    #[error("Invalid timing base_url: {0}")]
    InvalidBaseUrl(String),

    #[error("Invalid api_prefix: {0}. Must be empty or start with '/'")]
    InvalidApiPrefix(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .pitline/config.yaml
    /// 3. .pitline/local.yaml (optional developer overrides)
    /// 4. `explicit`, when given on the command line
    /// 5. Environment variables (PITLINE_* prefix)
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        Self::load_from_dir(Path::new(CONFIG_DIR), explicit)
    }

    /// Same as [`ConfigLoader::load`] with the project files read from `dir`.
    pub fn load_from_dir(dir: &Path, explicit: Option<&Path>) -> Result<Config> {
        if let Some(path) = explicit {
            if !path.exists() {
                anyhow::bail!("config file not found: {}", path.display());
            }
        }

        let config: Config = Self::figment(dir, explicit)
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// The merged provider chain, before extraction.
    pub fn figment(dir: &Path, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")));
        if let Some(path) = explicit {
            figment = figment.merge(Yaml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        // Server
        let prefix = &config.server.api_prefix;
        if !prefix.is_empty() && !prefix.starts_with('/') {
            return Err(ConfigError::InvalidApiPrefix(prefix.clone()));
        }

        // Database
        if config.database.path.trim().is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(config.database.max_connections));
        }

        // Auth
        if config.auth.secret_key.trim().len() < MIN_SECRET_KEY_LENGTH {
            return Err(ConfigError::WeakSecretKey);
        }
        if !(1..=MAX_TOKEN_EXPIRY_MINUTES).contains(&config.auth.access_token_expire_minutes) {
            return Err(ConfigError::InvalidTokenExpiry(config.auth.access_token_expire_minutes));
        }

        // Timing provider
        match Url::parse(&config.timing.base_url) {
            Ok(url) if !url.cannot_be_a_base() && matches!(url.scheme(), "http" | "https") => {}
            _ => return Err(ConfigError::InvalidBaseUrl(config.timing.base_url.clone())),
        }
        if config.timing.requests_per_second <= 0.0 || !config.timing.requests_per_second.is_finite() {
            return Err(ConfigError::InvalidRateLimit(config.timing.requests_per_second));
        }
        if config.timing.burst_size == 0 {
            return Err(ConfigError::InvalidBurstSize(config.timing.burst_size));
        }
        if config.timing.max_concurrent_downloads == 0 {
            return Err(ConfigError::InvalidConcurrency(config.timing.max_concurrent_downloads));
        }
        if config.timing.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(config.timing.timeout_secs));
        }

        // Retry
        if config.retry.initial_backoff_ms >= config.retry.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                config.retry.initial_backoff_ms,
                config.retry.max_backoff_ms,
            ));
        }

        // Cache
        if config.cache.redis_ttl_secs == 0 {
            return Err(ConfigError::InvalidCacheTtl("redis"));
        }
        if config.cache.disk_ttl_secs == 0 {
            return Err(ConfigError::InvalidCacheTtl("disk"));
        }

        // Logging
        if !VALID_LOG_LEVELS.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }
        if !VALID_LOG_FORMATS.contains(&config.logging.format.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }
        if !VALID_ROTATIONS.contains(&config.logging.rotation.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        Ok(())
    }
}
