//! Timing data ports.
//!
//! A [`TimingSource`] produces session telemetry, either by calling the
//! external provider or by decorating another source with caching. A
//! [`SessionCache`] is one cache tier; it never fails a request and reports
//! any internal failure as a miss.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{SessionKey, SessionTelemetry};

#[async_trait]
pub trait TimingSource: Send + Sync {
    /// Load all drivers and laps of a session.
    async fn load_session(&self, key: &SessionKey) -> DomainResult<SessionTelemetry>;

    /// Short name used in logs and import reports.
    fn name(&self) -> &'static str;

    /// Load a session and report where the data came from: a cache tier
    /// name, or the source's own name on a direct fetch.
    async fn load_session_with_origin(&self, key: &SessionKey) -> DomainResult<(SessionTelemetry, &'static str)> {
        Ok((self.load_session(key).await?, self.name()))
    }
}

#[async_trait]
pub trait SessionCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<SessionTelemetry>;

    async fn put(&self, key: &str, telemetry: &SessionTelemetry);

    /// Tier name used in logs.
    fn tier(&self) -> &'static str;
}
