// handlers/protected/panels.rs - panel CRUD and assignment
//
// GET routes are open to any authenticated user (results scoped by the
// service); every write requires an admin, checked before the path id or
// body is decoded.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::Value;

use crate::database::models::{NewPanel, PanelPatch, PanelView, Role};
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::services::require_role;
use crate::state::AppState;

/// GET /panels
pub async fn panels_list(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
) -> ApiResult<Vec<PanelView>> {
    let panels = state.panels.list(&actor).await?;
    Ok(ApiResponse::success(panels))
}

/// POST /panels
pub async fn panel_post(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    payload: Result<Json<NewPanel>, JsonRejection>,
) -> ApiResult<PanelView> {
    require_role(&actor, Role::Admin)?;
    let Json(fields) = payload?;
    let panel = state.panels.create(&actor, fields).await?;
    Ok(ApiResponse::success(panel))
}

/// GET /panels/:id
pub async fn panel_get(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<PanelView> {
    let panel_id = parse_id(&id, "Panel")?;
    let panel = state.panels.get(&actor, panel_id).await?;
    Ok(ApiResponse::success(panel))
}

/// PUT /panels/:id - partial update; absent fields are left alone
pub async fn panel_put(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Path(id): Path<String>,
    payload: Result<Json<PanelPatch>, JsonRejection>,
) -> ApiResult<PanelView> {
    require_role(&actor, Role::Admin)?;
    let panel_id = parse_id(&id, "Panel")?;
    let Json(patch) = payload?;
    let panel = state.panels.update(&actor, panel_id, patch).await?;
    Ok(ApiResponse::success(panel))
}

/// DELETE /panels/:id
pub async fn panel_delete(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    require_role(&actor, Role::Admin)?;
    let panel_id = parse_id(&id, "Panel")?;
    state.panels.delete(&actor, panel_id).await?;
    Ok(ApiResponse::message("Panel deleted successfully"))
}

/// POST /panels/:id/assign/:user_id
pub async fn panel_assign(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Path((id, user_id)): Path<(String, String)>,
) -> ApiResult<PanelView> {
    require_role(&actor, Role::Admin)?;
    let panel_id = parse_id(&id, "Panel")?;
    let user_id = parse_id(&user_id, "User")?;
    let panel = state.panels.assign(&actor, panel_id, user_id).await?;
    Ok(ApiResponse::success(panel))
}

/// POST /panels/:id/unassign
pub async fn panel_unassign(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<PanelView> {
    require_role(&actor, Role::Admin)?;
    let panel_id = parse_id(&id, "Panel")?;
    let panel = state.panels.unassign(&actor, panel_id).await?;
    Ok(ApiResponse::success(panel))
}
