use axum::extract::State;
use tracing::info;

use crate::adapters::http::extract::ApiPath;
use crate::adapters::http::response::{ApiResponse, ApiResult};
use crate::adapters::http::state::AppState;
use crate::services::ImportReport;

pub async fn import_race(
    State(state): State<AppState>,
    ApiPath((season, round)): ApiPath<(i64, i64)>,
) -> ApiResult<ImportReport> {
    info!(season, round, "import requested over HTTP");
    let report = state.importer.import_race(season, round).await?;
    Ok(ApiResponse::ok(report))
}
