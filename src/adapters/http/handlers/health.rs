use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use crate::adapters::http::response::{ApiResponse, ApiResult};

pub const HEALTHY_MESSAGE: &str = "Pitline Corner Backend is healthy";

/// Unversioned liveness check.
pub async fn liveness() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": HEALTHY_MESSAGE,
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub message: &'static str,
    pub version: &'static str,
}

pub async fn health() -> ApiResult<HealthStatus> {
    Ok(ApiResponse::ok(HealthStatus {
        status: "healthy",
        message: HEALTHY_MESSAGE,
        version: env!("CARGO_PKG_VERSION"),
    }))
}
