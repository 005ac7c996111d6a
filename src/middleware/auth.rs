use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated caller, loaded fresh from the store for this request
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// JWT authentication middleware that resolves the bearer token to a user
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers).map_err(ApiError::unauthorized)?;

    let user = state.gate.resolve(token).await?;
    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or("Not authenticated")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        Some(_) => Err("Empty bearer token"),
        None => Err("Authorization header must use Bearer token format"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(extract_jwt_from_headers(&headers("Bearer abc.def.ghi")), Ok("abc.def.ghi"));
    }

    #[test]
    fn rejects_missing_or_malformed_header() {
        assert!(extract_jwt_from_headers(&HeaderMap::new()).is_err());
        assert!(extract_jwt_from_headers(&headers("Basic dXNlcjpwYXNz")).is_err());
        assert!(extract_jwt_from_headers(&headers("Bearer   ")).is_err());
    }
}
