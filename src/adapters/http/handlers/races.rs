use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::adapters::http::extract::{ApiPath, ApiQuery};
use crate::adapters::http::response::{ApiResponse, ApiResult};
use crate::adapters::http::state::AppState;
use crate::domain::models::{LapData, PitStop, Race, RaceWithCircuit, ResultWithDriver, Season};

#[derive(Debug, Default, Deserialize)]
pub struct RaceListQuery {
    pub season: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DriverFilter {
    pub driver_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RaceList {
    pub races: Vec<Race>,
}

#[derive(Debug, Serialize)]
pub struct LapList {
    pub lap_data: Vec<LapData>,
}

#[derive(Debug, Serialize)]
pub struct PitStopList {
    pub pit_stops: Vec<PitStop>,
}

#[derive(Debug, Serialize)]
pub struct ResultList {
    pub results: Vec<ResultWithDriver>,
}

#[derive(Debug, Serialize)]
pub struct SeasonList {
    pub seasons: Vec<Season>,
}

pub async fn list_races(State(state): State<AppState>, ApiQuery(query): ApiQuery<RaceListQuery>) -> ApiResult<RaceList> {
    let races = state.races.list_races(query.season).await?;
    Ok(ApiResponse::ok(RaceList { races }))
}

pub async fn get_race(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<RaceWithCircuit> {
    Ok(ApiResponse::ok(state.races.get_race(id).await?))
}

pub async fn race_laps(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(filter): ApiQuery<DriverFilter>,
) -> ApiResult<LapList> {
    let lap_data = state.races.race_laps(id, filter.driver_id).await?;
    Ok(ApiResponse::ok(LapList { lap_data }))
}

pub async fn race_pit_stops(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(filter): ApiQuery<DriverFilter>,
) -> ApiResult<PitStopList> {
    let pit_stops = state.races.race_pit_stops(id, filter.driver_id).await?;
    Ok(ApiResponse::ok(PitStopList { pit_stops }))
}

pub async fn race_results(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<ResultList> {
    let results = state.races.race_results(id).await?;
    Ok(ApiResponse::ok(ResultList { results }))
}

pub async fn fastest_lap(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(filter): ApiQuery<DriverFilter>,
) -> ApiResult<LapData> {
    Ok(ApiResponse::ok(state.races.fastest_lap(id, filter.driver_id).await?))
}

pub async fn list_seasons(State(state): State<AppState>) -> ApiResult<SeasonList> {
    let seasons = state.races.seasons().await?;
    Ok(ApiResponse::ok(SeasonList { seasons }))
}

pub async fn get_season(State(state): State<AppState>, ApiPath(year): ApiPath<i64>) -> ApiResult<Season> {
    Ok(ApiResponse::ok(state.races.season(year).await?))
}
