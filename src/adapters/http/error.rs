use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Query string, path or body that failed to deserialize.
    #[error("{0}")]
    Malformed(String),

    #[error("Not authenticated")]
    MissingToken,
}

impl ApiError {
    /// Status, error code and client-facing message.
    pub fn parts(&self) -> (StatusCode, &'static str, String) {
        let message = self.to_string();
        match self {
            ApiError::Malformed(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR", message),
            ApiError::MissingToken => (StatusCode::UNAUTHORIZED, "NOT_AUTHENTICATED", message),
            ApiError::Domain(err) => match err {
                DomainError::RaceNotFound(_) => (StatusCode::NOT_FOUND, "RACE_NOT_FOUND", message),
                DomainError::DriverNotFound(_) => (StatusCode::NOT_FOUND, "DRIVER_NOT_FOUND", message),
                DomainError::CircuitNotFound(_) => (StatusCode::NOT_FOUND, "CIRCUIT_NOT_FOUND", message),
                DomainError::TeamNotFound(_) => (StatusCode::NOT_FOUND, "TEAM_NOT_FOUND", message),
                DomainError::SeasonNotFound(_) => (StatusCode::NOT_FOUND, "SEASON_NOT_FOUND", message),
                DomainError::LapNotFound(_) => (StatusCode::NOT_FOUND, "LAP_NOT_FOUND", message),
                DomainError::UserNotFound(_) => (StatusCode::NOT_FOUND, "USER_NOT_FOUND", message),
                DomainError::SimulationNotFound(_) => (StatusCode::NOT_FOUND, "SIMULATION_NOT_FOUND", message),
                DomainError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT", message),
                DomainError::ValidationFailed(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR", message),
                DomainError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT", message),
                DomainError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message),
                DomainError::PasswordMismatch => (StatusCode::BAD_REQUEST, "PASSWORD_MISMATCH", message),
                DomainError::EmailExists(_) => (StatusCode::BAD_REQUEST, "EMAIL_EXISTS", message),
                DomainError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS", message),
                DomainError::TimingUnavailable(_) => (StatusCode::BAD_REQUEST, "IMPORT_FAILED", message),
                DomainError::DatabaseError(_) | DomainError::SerializationError(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                ),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let body = Json(json!({
            "detail": {
                "error": {
                    "code": code,
                    "message": message,
                }
            }
        }));

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Malformed(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Malformed(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Malformed(rejection.body_text())
    }
}
