// handlers/public/auth/register.rs - POST /auth/register handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{AuthSession, Registration};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// POST /auth/register - Register new user account
///
/// Open to anyone. The first account ever created becomes the administrator;
/// every later one is a plain user.
///
/// Expected Input:
/// ```json
/// { "email": "string", "password": "string", "full_name": "string" }
/// ```
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<AuthSession> {
    let Json(request) = payload?;

    let session = state
        .users
        .register(Registration {
            email: request.email,
            password: request.password,
            full_name: request.full_name,
        })
        .await?;

    Ok(ApiResponse::success(session))
}
