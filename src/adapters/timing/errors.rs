use reqwest::StatusCode;
use thiserror::Error;

use crate::domain::errors::DomainError;

/// Errors that can occur when talking to the timing data archive
#[derive(Error, Debug)]
pub enum TimingError {
    /// File does not exist in the archive (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded - too many requests")]
    RateLimitExceeded,

    /// Server error from the archive host (HTTP 5xx)
    #[error("Server error ({0}): {1}")]
    ServerError(StatusCode, String),

    /// Any other non-success status
    #[error("Request rejected ({0}): {1}")]
    ClientError(StatusCode, String),

    /// Network or connection error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Body could not be decoded
    #[error("Malformed payload: {0}")]
    Decode(String),

    /// Base URL cannot carry path segments
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

impl TimingError {
    /// Returns true if this error is transient and should be retried
    pub fn is_transient(&self) -> bool {
        match self {
            TimingError::RateLimitExceeded | TimingError::ServerError(_, _) => true,
            TimingError::NetworkError(e) => !e.is_decode() && !e.is_builder(),
            _ => false,
        }
    }

    pub fn from_status(status: StatusCode, url: &str, body: String) -> Self {
        match status {
            StatusCode::NOT_FOUND => TimingError::NotFound(url.to_string()),
            StatusCode::TOO_MANY_REQUESTS => TimingError::RateLimitExceeded,
            status if status.is_server_error() => TimingError::ServerError(status, body),
            status => TimingError::ClientError(status, body),
        }
    }
}

impl From<TimingError> for DomainError {
    fn from(err: TimingError) -> Self {
        DomainError::TimingUnavailable(err.to_string())
    }
}
