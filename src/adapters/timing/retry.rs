use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::errors::TimingError;
use crate::domain::models::RetryConfig;

/// Retry policy for transient archive failures
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    initial_backoff_ms: u64,
    max_backoff_ms: u64,
}

impl RetryPolicy {
    /// Create a new retry policy. A `max_backoff_ms` below the initial
    /// backoff is raised to it.
    pub fn new(max_retries: u32, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            initial_backoff_ms,
            max_backoff_ms: max_backoff_ms.max(initial_backoff_ms),
        }
    }

    /// Execute an operation with exponential backoff retry logic
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, TimingError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TimingError>>,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 0 {
                        debug!(retries = attempt, "request succeeded after retries");
                    }
                    return Ok(result);
                }
                Err(err) if self.should_retry(&err, attempt) => {
                    let backoff = self.calculate_backoff(attempt);
                    warn!(
                        attempt = attempt + 1,
                        error = %err,
                        backoff_ms = backoff.as_millis() as u64,
                        "transient timing error, retrying"
                    );
                    sleep(backoff).await;
                    attempt += 1;
                }
                Err(err) => {
                    if attempt >= self.max_retries && err.is_transient() {
                        warn!(attempts = attempt + 1, error = %err, "giving up after retries");
                    }
                    return Err(err);
                }
            }
        }
    }

    /// min(initial_backoff * 2^attempt, max_backoff)
    fn calculate_backoff(&self, attempt: u32) -> Duration {
        let backoff_ms = self
            .initial_backoff_ms
            .saturating_mul(2_u64.saturating_pow(attempt))
            .min(self.max_backoff_ms);

        Duration::from_millis(backoff_ms)
    }

    fn should_retry(&self, error: &TimingError, attempt: u32) -> bool {
        attempt < self.max_retries && error.is_transient()
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_retries, config.initial_backoff_ms, config.max_backoff_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_backoff_calculation() {
        let policy = RetryPolicy::new(5, 1000, 10_000);

        assert_eq!(policy.calculate_backoff(0), Duration::from_millis(1000));
        assert_eq!(policy.calculate_backoff(1), Duration::from_millis(2000));
        assert_eq!(policy.calculate_backoff(3), Duration::from_millis(8000));
        assert_eq!(policy.calculate_backoff(4), Duration::from_millis(10_000));
        assert_eq!(policy.calculate_backoff(40), Duration::from_millis(10_000));
    }

    #[test]
    fn test_should_not_retry_permanent_or_exhausted() {
        let policy = RetryPolicy::new(3, 1, 10);

        assert!(policy.should_retry(&TimingError::RateLimitExceeded, 0));
        assert!(!policy.should_retry(&TimingError::RateLimitExceeded, 3));
        assert!(!policy.should_retry(&TimingError::NotFound("x".to_string()), 0));
    }

    #[tokio::test]
    async fn test_execute_retries_transient_then_succeeds() {
        let policy = RetryPolicy::new(3, 1, 5);
        let calls = AtomicU32::new(0);

        let result = policy
            .execute(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(TimingError::ServerError(StatusCode::BAD_GATEWAY, String::new()))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_execute_stops_on_permanent_error() {
        let policy = RetryPolicy::new(3, 1, 5);
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = policy
            .execute(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TimingError::NotFound("laptimes.json".to_string())) }
            })
            .await;

        assert!(matches!(result, Err(TimingError::NotFound(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_execute_gives_up_after_max_retries() {
        let policy = RetryPolicy::new(2, 1, 5);
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = policy
            .execute(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TimingError::RateLimitExceeded) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
