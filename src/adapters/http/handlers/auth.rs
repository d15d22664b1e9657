use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::adapters::http::extract::{ApiJson, CurrentUser};
use crate::adapters::http::response::{ApiResponse, ApiResult};
use crate::adapters::http::state::AppState;
use crate::domain::models::User;
use crate::services::AuthSession;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub email: String,
    pub tier: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user: UserSummary,
}

impl From<AuthSession> for TokenResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            access_token: session.access_token,
            token_type: session.token_type,
            user: UserSummary {
                id: session.user.id,
                email: session.user.email,
                tier: session.user.tier,
            },
        }
    }
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> ApiResult<TokenResponse> {
    let session = state
        .auth
        .register(&body.email, &body.password, &body.password_confirm)
        .await?;
    Ok(ApiResponse::created(session.into()))
}

pub async fn login(State(state): State<AppState>, ApiJson(body): ApiJson<LoginRequest>) -> ApiResult<TokenResponse> {
    let session = state.auth.login(&body.email, &body.password).await?;
    Ok(ApiResponse::ok(session.into()))
}

pub async fn me(CurrentUser(user): CurrentUser) -> ApiResult<User> {
    Ok(ApiResponse::ok(user))
}
