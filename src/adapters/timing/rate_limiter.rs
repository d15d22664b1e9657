//! Request throttling for the timing archive.

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::time::Duration;

/// Token bucket rate limiter shared by all requests of a client.
///
/// Starts with a full bucket of `burst_size` tokens that refill at
/// `requests_per_second`.
pub struct RequestRateLimiter {
    inner: DefaultDirectRateLimiter,
}

impl RequestRateLimiter {
    pub fn new(requests_per_second: f64, burst_size: u32) -> Self {
        let burst = NonZeroU32::new(burst_size).unwrap_or(NonZeroU32::MIN);
        let period = Duration::from_secs_f64(1.0 / requests_per_second.max(0.001));
        let quota = Quota::with_period(period)
            .map(|q| q.allow_burst(burst))
            .unwrap_or_else(|| Quota::per_second(burst));

        Self {
            inner: RateLimiter::direct(quota),
        }
    }

    /// Wait until a request may be sent.
    pub async fn acquire(&self) {
        self.inner.until_ready().await;
    }

    /// Take a token without waiting; false when the bucket is empty.
    pub fn try_acquire(&self) -> bool {
        self.inner.check().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_burst_is_immediate() {
        let limiter = RequestRateLimiter::new(2.0, 5);

        let start = Instant::now();
        for _ in 0..5 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_millis(100), "Burst should be immediate");
        assert!(!limiter.try_acquire());
    }

    #[tokio::test]
    async fn test_enforces_delay_after_burst() {
        let limiter = RequestRateLimiter::new(4.0, 1);
        limiter.acquire().await;

        let start = Instant::now();
        limiter.acquire().await;
        let elapsed = start.elapsed();

        assert!(
            elapsed >= Duration::from_millis(200),
            "Expected delay >= 200ms, got {:?}",
            elapsed
        );
    }
}
