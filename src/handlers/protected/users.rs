// handlers/protected/users.rs - admin user management
//
// The role check runs before the path id or body is looked at, so a
// non-admin always gets 403.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::database::models::{Role, User};
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::services::require_role;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RoleUpdate {
    pub role: Role,
}

/// GET /users
pub async fn users_list(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
) -> ApiResult<Vec<User>> {
    let users = state.users.list_users(&actor).await?;
    Ok(ApiResponse::success(users))
}

/// PUT /users/:id/role
pub async fn user_role_put(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Path(id): Path<String>,
    payload: Result<Json<RoleUpdate>, JsonRejection>,
) -> ApiResult<User> {
    require_role(&actor, Role::Admin)?;
    let user_id = parse_id(&id, "User")?;
    let Json(update) = payload?;

    let user = state.users.change_role(&actor, user_id, update.role).await?;
    Ok(ApiResponse::success(user))
}

/// DELETE /users/:id - unassigns the user's panels, then removes the account
pub async fn user_delete(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    require_role(&actor, Role::Admin)?;
    let user_id = parse_id(&id, "User")?;
    state.users.delete_user(&actor, user_id).await?;
    Ok(ApiResponse::message("User deleted successfully"))
}
