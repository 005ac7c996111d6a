// handlers/public/auth/login.rs - POST /auth/login handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::AuthSession;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login - exchange email and password for a bearer token
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<AuthSession> {
    let Json(request) = payload?;
    let session = state.users.login(&request.email, &request.password).await?;
    Ok(ApiResponse::success(session))
}
