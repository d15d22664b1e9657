//! Client for the external timing data archive.

pub mod client;
pub mod errors;
pub mod rate_limiter;
pub mod retry;
pub mod types;

pub use client::{TimingClientConfig, TracingInsightsClient};
pub use errors::TimingError;
pub use rate_limiter::RequestRateLimiter;
pub use retry::RetryPolicy;
