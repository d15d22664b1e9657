//! Domain errors for the Pitline backend.

use thiserror::Error;

/// Domain-level errors that can occur in the Pitline system.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Race not found: {0}")]
    RaceNotFound(String),

    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    #[error("Circuit not found: {0}")]
    CircuitNotFound(String),

    #[error("Team not found: {0}")]
    TeamNotFound(String),

    #[error("Season not found: {0}")]
    SeasonNotFound(i64),

    #[error("Lap not found: {0}")]
    LapNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Simulation not found: {0}")]
    SimulationNotFound(i64),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Email already registered: {0}")]
    EmailExists(String),

    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Timing data unavailable: {0}")]
    TimingUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return DomainError::Conflict(db_err.message().to_string());
            }
        }
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
