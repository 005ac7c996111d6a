pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;

#[cfg(test)]
pub mod testing;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::middleware::jwt_auth_middleware;
pub use crate::state::AppState;

/// Build the full HTTP application around `state`
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security);
    let request_logging = state.config.api.enable_request_logging;

    let router = Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(auth_public_routes())
        // Protected
        .merge(protected_routes(state.clone()))
        .with_state(state);

    let router = match cors {
        Some(cors) => router.layer(cors),
        None => router,
    };

    if request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn auth_public_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/auth/register", post(auth::register_post))
        .route("/auth/login", post(auth::login_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::{auth, panels, users};

    Router::new()
        .route("/auth/me", get(auth::whoami_get))
        // User management (admin)
        .route("/users", get(users::users_list))
        .route("/users/:id", axum::routing::delete(users::user_delete))
        .route("/users/:id/role", put(users::user_role_put))
        // Panels
        .route("/panels", get(panels::panels_list).post(panels::panel_post))
        .route(
            "/panels/:id",
            get(panels::panel_get)
                .put(panels::panel_put)
                .delete(panels::panel_delete),
        )
        .route("/panels/:id/assign/:user_id", post(panels::panel_assign))
        .route("/panels/:id/unassign", post(panels::panel_unassign))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if security.cors_origins.iter().any(|o| o == "*") {
        return Some(layer.allow_origin(Any));
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    Some(layer.allow_origin(origins))
}
