//! Drivers, teams and circuits.

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::adapters::http::extract::{ApiPath, ApiQuery};
use crate::adapters::http::response::{ApiResponse, ApiResult};
use crate::adapters::http::state::AppState;
use crate::domain::models::{Circuit, Driver};
use crate::services::Team;

#[derive(Debug, Default, Deserialize)]
pub struct DriverQuery {
    pub search: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CircuitQuery {
    pub country: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DriverList {
    pub drivers: Vec<Driver>,
}

#[derive(Debug, Serialize)]
pub struct TeamList {
    pub teams: Vec<Team>,
}

#[derive(Debug, Serialize)]
pub struct CircuitList {
    pub circuits: Vec<Circuit>,
}

pub async fn list_drivers(State(state): State<AppState>, ApiQuery(query): ApiQuery<DriverQuery>) -> ApiResult<DriverList> {
    let drivers = state.drivers.list_drivers(query.search.as_deref(), query.limit).await?;
    Ok(ApiResponse::ok(DriverList { drivers }))
}

pub async fn get_driver(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<Driver> {
    Ok(ApiResponse::ok(state.drivers.get_driver(id).await?))
}

pub async fn list_teams(State(state): State<AppState>) -> ApiResult<TeamList> {
    let teams = state.drivers.list_teams().await?;
    Ok(ApiResponse::ok(TeamList { teams }))
}

pub async fn get_team(State(state): State<AppState>, ApiPath(name): ApiPath<String>) -> ApiResult<Team> {
    Ok(ApiResponse::ok(state.drivers.get_team(&name).await?))
}

pub async fn list_circuits(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CircuitQuery>,
) -> ApiResult<CircuitList> {
    let circuits = state.circuits.list_circuits(query.country.as_deref()).await?;
    Ok(ApiResponse::ok(CircuitList { circuits }))
}

pub async fn get_circuit(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<Circuit> {
    Ok(ApiResponse::ok(state.circuits.get_circuit(id).await?))
}
