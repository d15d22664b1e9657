use std::path::PathBuf;
use std::str::FromStr;

use crate::domain::models::LoggingConfig;

/// Parsed logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    pub format: LogFormat,

    /// Directory for log files (stderr only when unset)
    pub log_dir: Option<PathBuf>,

    pub rotation: RotationPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(format!("invalid log format: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RotationPolicy {
    #[default]
    Daily,
    Hourly,
    Never,
}

impl FromStr for RotationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "hourly" => Ok(Self::Hourly),
            "never" => Ok(Self::Never),
            other => Err(format!("invalid log rotation: {other}")),
        }
    }
}

impl TryFrom<&LoggingConfig> for LogConfig {
    type Error = String;

    fn try_from(config: &LoggingConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            level: config.level.to_lowercase(),
            format: config.format.parse()?,
            log_dir: config.log_dir.as_ref().map(PathBuf::from),
            rotation: config.rotation.parse()?,
        })
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            log_dir: None,
            rotation: RotationPolicy::default(),
        }
    }
}
