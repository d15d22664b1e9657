use serde::{Deserialize, Serialize};

/// Main configuration structure for Pitline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Token signing configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Timing provider configuration
    #[serde(default)]
    pub timing: TimingConfig,

    /// Retry policy for provider requests
    #[serde(default)]
    pub retry: RetryConfig,

    /// Session cache tiers
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Prefix for the versioned API routes
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Allowed CORS origins; empty allows any origin
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    8000
}

fn default_api_prefix() -> String {
    "/api/v1".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
    ]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_prefix: default_api_prefix(),
            cors_origins: default_cors_origins(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".pitline/pitline.db".to_string()
}

const fn default_max_connections() -> u32 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Token signing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AuthConfig {
    /// HS256 signing secret
    #[serde(default = "default_secret_key")]
    pub secret_key: String,

    /// Access token lifetime in minutes
    #[serde(default = "default_access_token_expire_minutes")]
    pub access_token_expire_minutes: i64,
}

fn default_secret_key() -> String {
    "change-this-secret-key-in-production".to_string()
}

const fn default_access_token_expire_minutes() -> i64 {
    60 * 24 * 8
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: default_secret_key(),
            access_token_expire_minutes: default_access_token_expire_minutes(),
        }
    }
}

/// Timing provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TimingConfig {
    /// Root of the telemetry archive
    #[serde(default = "default_timing_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Requests per second allowed
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: f64,

    /// Burst size for token bucket
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,

    /// Per-driver lap downloads in flight at once
    #[serde(default = "default_max_concurrent_downloads")]
    pub max_concurrent_downloads: usize,
}

fn default_timing_base_url() -> String {
    "https://raw.githubusercontent.com/TracingInsights-Archive".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_requests_per_second() -> f64 {
    5.0
}

const fn default_burst_size() -> u32 {
    10
}

const fn default_max_concurrent_downloads() -> usize {
    4
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            base_url: default_timing_base_url(),
            timeout_secs: default_timeout_secs(),
            requests_per_second: default_requests_per_second(),
            burst_size: default_burst_size(),
            max_concurrent_downloads: default_max_concurrent_downloads(),
        }
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    500
}

const fn default_max_backoff_ms() -> u64 {
    10_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Session cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CacheConfig {
    /// Disables both tiers when false
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,

    /// Remote tier; skipped when unset
    #[serde(default)]
    pub redis_url: Option<String>,

    #[serde(default = "default_redis_ttl_secs")]
    pub redis_ttl_secs: u64,

    /// Seconds to wait before retrying an unreachable Redis
    #[serde(default = "default_redis_retry_after_secs")]
    pub redis_retry_after_secs: u64,

    /// Directory for the on-disk tier
    #[serde(default = "default_disk_dir")]
    pub disk_dir: String,

    #[serde(default = "default_disk_ttl_secs")]
    pub disk_ttl_secs: u64,
}

const fn default_cache_enabled() -> bool {
    true
}

const fn default_redis_ttl_secs() -> u64 {
    7 * 24 * 3600
}

const fn default_redis_retry_after_secs() -> u64 {
    60
}

fn default_disk_dir() -> String {
    ".pitline/cache".to_string()
}

const fn default_disk_ttl_secs() -> u64 {
    30 * 24 * 3600
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            redis_url: None,
            redis_ttl_secs: default_redis_ttl_secs(),
            redis_retry_after_secs: default_redis_retry_after_secs(),
            disk_dir: default_disk_dir(),
            disk_ttl_secs: default_disk_ttl_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.api_prefix, "/api/v1");
        assert_eq!(config.auth.access_token_expire_minutes, 11_520);
        assert_eq!(config.cache.redis_ttl_secs, 604_800);
        assert_eq!(config.timing.max_concurrent_downloads, 4);
        assert!(config.cache.redis_url.is_none());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "server:\n  port: 9000\ncache:\n  redis_url: redis://localhost:6379\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.cache.redis_url.as_deref(), Some("redis://localhost:6379"));
        assert_eq!(config.database.max_connections, 10);
    }
}
