use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::adapters::http::extract::{ApiJson, ApiQuery, CurrentUser};
use crate::adapters::http::response::{ApiResponse, ApiResult};
use crate::adapters::http::state::AppState;
use crate::domain::models::{Simulation, SimulationRequest};
use crate::services::strategy::{DefenseSimulation, OvertakeSimulation, PitStopSimulation, WeatherSimulation};

#[derive(Debug, Deserialize)]
pub struct PitStopQuery {
    pub race_id: i64,
    pub driver_id: i64,
    pub alternative_stop_lap: i64,
}

#[derive(Debug, Deserialize)]
pub struct OvertakeQuery {
    pub race_id: i64,
    pub driver_id: i64,
    pub target_driver_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct DefendQuery {
    pub race_id: i64,
    pub driver_id: i64,
    pub attacking_driver_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub race_id: i64,
    pub driver_id: i64,
    pub current_weather: String,
    pub expected_weather: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SimulationListQuery {
    pub race_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SimulationList {
    pub simulations: Vec<Simulation>,
}

pub async fn pit_stop(State(state): State<AppState>, ApiQuery(q): ApiQuery<PitStopQuery>) -> ApiResult<PitStopSimulation> {
    let result = state
        .strategy
        .calculate_alternative_strategy(q.race_id, q.driver_id, q.alternative_stop_lap)
        .await?;
    Ok(ApiResponse::ok(result))
}

pub async fn overtake(State(state): State<AppState>, ApiQuery(q): ApiQuery<OvertakeQuery>) -> ApiResult<OvertakeSimulation> {
    let result = state
        .strategy
        .analyze_overtake_opportunities(q.race_id, q.driver_id, q.target_driver_id)
        .await?;
    Ok(ApiResponse::ok(result))
}

pub async fn defend(State(state): State<AppState>, ApiQuery(q): ApiQuery<DefendQuery>) -> ApiResult<DefenseSimulation> {
    let result = state
        .strategy
        .calculate_defense_strategy(q.race_id, q.driver_id, q.attacking_driver_id)
        .await?;
    Ok(ApiResponse::ok(result))
}

pub async fn weather(State(state): State<AppState>, ApiQuery(q): ApiQuery<WeatherQuery>) -> ApiResult<WeatherSimulation> {
    let result = state
        .strategy
        .calculate_weather_strategy(q.race_id, q.driver_id, &q.current_weather, &q.expected_weather)
        .await?;
    Ok(ApiResponse::ok(result))
}

pub async fn create_simulation(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(request): ApiJson<SimulationRequest>,
) -> ApiResult<Simulation> {
    let simulation = state.simulations.run(&user, request).await?;
    Ok(ApiResponse::created(simulation))
}

pub async fn list_simulations(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(query): ApiQuery<SimulationListQuery>,
) -> ApiResult<SimulationList> {
    let simulations = state.simulations.list_for_user(user.id, query.race_id).await?;
    Ok(ApiResponse::ok(SimulationList { simulations }))
}
