use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::{Client as ReqwestClient, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::errors::TimingError;
use super::rate_limiter::RequestRateLimiter;
use super::retry::RetryPolicy;
use super::types::{DriversFile, LapTimesFile};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{DriverEntry, RawLap, RetryConfig, SessionKey, SessionTelemetry, TimingConfig};
use crate::domain::ports::TimingSource;

/// Configuration for the archive HTTP client
#[derive(Debug, Clone)]
pub struct TimingClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub requests_per_second: f64,
    pub burst_size: u32,
    pub max_concurrent_downloads: usize,
    pub retry: RetryConfig,
}

impl TimingClientConfig {
    pub fn from_config(timing: &TimingConfig, retry: &RetryConfig) -> Self {
        Self {
            base_url: timing.base_url.clone(),
            timeout_secs: timing.timeout_secs,
            requests_per_second: timing.requests_per_second,
            burst_size: timing.burst_size,
            max_concurrent_downloads: timing.max_concurrent_downloads,
            retry: retry.clone(),
        }
    }
}

impl Default for TimingClientConfig {
    fn default() -> Self {
        Self::from_config(&TimingConfig::default(), &RetryConfig::default())
    }
}

/// HTTP client for the TracingInsights telemetry archive
///
/// Provides:
/// - Connection pooling and reuse
/// - Rate limiting via token bucket
/// - Exponential backoff retry on transient failures
/// - Bounded concurrent per-driver downloads
pub struct TracingInsightsClient {
    http_client: ReqwestClient,
    base_url: Url,
    rate_limiter: Arc<RequestRateLimiter>,
    retry_policy: RetryPolicy,
    max_concurrent_downloads: usize,
}

impl TracingInsightsClient {
    pub fn new(config: TimingClientConfig) -> Result<Self, TimingError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| TimingError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(TimingError::InvalidUrl(config.base_url));
        }

        info!(
            base_url = %base_url,
            rate_limit_rps = config.requests_per_second,
            timeout_secs = config.timeout_secs,
            "initializing timing archive client"
        );

        let http_client = ReqwestClient::builder()
            .pool_max_idle_per_host(10)
            .timeout(Duration::from_secs(config.timeout_secs))
            .tcp_nodelay(true)
            .user_agent(concat!("pitline/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            base_url,
            rate_limiter: Arc::new(RequestRateLimiter::new(config.requests_per_second, config.burst_size)),
            retry_policy: RetryPolicy::from(&config.retry),
            max_concurrent_downloads: config.max_concurrent_downloads.max(1),
        })
    }

    /// `{base}/{season}/main/{event}/{session}/{tail...}`, each segment percent-encoded.
    pub fn session_url(&self, key: &SessionKey, tail: &[&str]) -> Result<Url, TimingError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| TimingError::InvalidUrl(self.base_url.to_string()))?;
            segments
                .pop_if_empty()
                .push(&key.season.to_string())
                .push("main")
                .push(&key.event_name)
                .push(&key.session);
            for part in tail {
                segments.push(part);
            }
        }
        Ok(url)
    }

    /// Fetch the driver list of a session.
    #[instrument(skip(self), fields(season = key.season, event = %key.event_name))]
    pub async fn fetch_drivers(&self, key: &SessionKey) -> Result<Vec<DriverEntry>, TimingError> {
        let url = self.session_url(key, &["drivers.json"])?;
        let file: DriversFile = self.get_json(&url).await?;
        Ok(file.into_entries())
    }

    /// Fetch the laps of one driver.
    #[instrument(skip(self), fields(season = key.season, event = %key.event_name))]
    pub async fn fetch_laps(&self, key: &SessionKey, driver_code: &str) -> Result<Vec<RawLap>, TimingError> {
        let url = self.session_url(key, &[driver_code, "laptimes.json"])?;
        let file: LapTimesFile = self.get_json(&url).await?;
        Ok(file.into_laps(driver_code))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, TimingError> {
        self.retry_policy
            .execute(|| async {
                self.rate_limiter.acquire().await;
                debug!(%url, "GET");

                let response = self.http_client.get(url.clone()).send().await?;
                let status = response.status();
                if status != StatusCode::OK {
                    let body = response.text().await.unwrap_or_default();
                    return Err(TimingError::from_status(status, url.as_str(), body));
                }

                let bytes = response.bytes().await?;
                serde_json::from_slice(&bytes).map_err(|e| TimingError::Decode(format!("{url}: {e}")))
            })
            .await
    }
}

#[async_trait]
impl TimingSource for TracingInsightsClient {
    #[instrument(skip(self), fields(season = key.season, event = %key.event_name, session = %key.session))]
    async fn load_session(&self, key: &SessionKey) -> DomainResult<SessionTelemetry> {
        let drivers = self.fetch_drivers(key).await.map_err(|e| match e {
            TimingError::NotFound(url) => DomainError::TimingUnavailable(format!("no driver list at {url}")),
            other => other.into(),
        })?;

        let codes: Vec<String> = drivers.iter().map(|d| d.code.clone()).collect();
        let downloads: Vec<(String, Result<Vec<RawLap>, TimingError>)> = stream::iter(codes)
            .map(|code| async move {
                let result = self.fetch_laps(key, &code).await;
                (code, result)
            })
            .buffer_unordered(self.max_concurrent_downloads)
            .collect()
            .await;

        let mut laps = Vec::new();
        let mut skipped = 0;
        for (code, result) in downloads {
            match result {
                Ok(driver_laps) => laps.extend(driver_laps),
                Err(TimingError::NotFound(_)) => {
                    warn!(driver = %code, "no lap data for driver, skipping");
                    skipped += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        if laps.is_empty() {
            return Err(DomainError::TimingUnavailable(format!(
                "no lap data for {} {} {}",
                key.season, key.event_name, key.session
            )));
        }

        laps.sort_by(|a, b| {
            a.driver_code
                .cmp(&b.driver_code)
                .then(a.lap_number.cmp(&b.lap_number))
        });

        info!(drivers = drivers.len(), skipped, laps = laps.len(), "downloaded session telemetry");

        Ok(SessionTelemetry {
            key: key.clone(),
            drivers,
            laps,
        })
    }

    fn name(&self) -> &'static str {
        "tracing-insights"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> TracingInsightsClient {
        TracingInsightsClient::new(TimingClientConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_session_url_encodes_event_name() {
        let client = client("https://raw.githubusercontent.com/TracingInsights-Archive");
        let key = SessionKey::race(2024, "São Paulo Grand Prix");

        let url = client.session_url(&key, &["VER", "laptimes.json"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://raw.githubusercontent.com/TracingInsights-Archive/2024/main/S%C3%A3o%20Paulo%20Grand%20Prix/Race/VER/laptimes.json"
        );
    }

    #[test]
    fn test_session_url_tolerates_trailing_slash() {
        let client = client("http://localhost:8080/archive/");
        let key = SessionKey::race(2024, "Bahrain Grand Prix");

        let url = client.session_url(&key, &["drivers.json"]).unwrap();
        assert_eq!(url.path(), "/archive/2024/main/Bahrain%20Grand%20Prix/Race/drivers.json");
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let result = TracingInsightsClient::new(TimingClientConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(TimingError::InvalidUrl(_))));
    }
}
