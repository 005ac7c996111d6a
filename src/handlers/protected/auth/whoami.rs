use axum::Extension;

use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};

/// GET /auth/me - the authenticated caller's current record
pub async fn whoami_get(Extension(CurrentUser(user)): Extension<CurrentUser>) -> ApiResult<User> {
    Ok(ApiResponse::success(user))
}
