use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use super::error::ApiError;

#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub timestamp: String,
}

/// Success envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub meta: Meta,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data,
            meta: Meta {
                timestamp: Utc::now().to_rfc3339(),
            },
            status: StatusCode::OK,
        }
    }

    pub fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(data)
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;
