// handlers/mod.rs - two-tier handler layout
//
// Public (no auth) and Protected (bearer token, resolved by jwt_auth_middleware).
// Role checks live in the services, not in the routing.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::state::AppState;

pub mod protected;
pub mod public;

/// GET / - service name and version
pub async fn root() -> impl IntoResponse {
    ApiResponse::success(json!({
        "name": "Solar Panel API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Solar panel asset management with role-based access",
    }))
}

/// GET /health - liveness plus a store round-trip
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}

/// A path id that is not a UUID cannot name an existing record.
pub(crate) fn parse_id(raw: &str, entity: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(format!("{} not found", entity)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_id_is_not_found() {
        let err = parse_id("not-a-uuid", "Panel").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "Panel not found");

        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "Panel").unwrap(), id);
    }
}
