use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::{decode_token, TokenType};
use crate::database::models::UserRole;
use crate::error::ApiError;
use crate::handlers::ServiceState;

/// Authenticated caller context extracted from a bearer token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub role: UserRole,
}

/// Bearer-token middleware for endpoints that need the caller's identity.
/// Validates the access token and injects an [`AuthUser`] extension.
pub async fn require_auth(
    State(state): State<ServiceState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(&headers)?;

    let claims = decode_token(&token, TokenType::Access, &state.config.security)
        .map_err(|e| ApiError::unauthorized(e.to_string()))?;

    request.extensions_mut().insert(AuthUser {
        user_id: claims.sub,
        username: claims.username,
        role: claims.role,
    });

    Ok(next.run(request).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<String, ApiError> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header format"))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(ApiError::unauthorized(
            "Authorization header must be 'Bearer <token>'",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_bearer(&headers).unwrap(), "abc.def");
    }

    #[test]
    fn rejects_missing_or_malformed_header() {
        let headers = HeaderMap::new();
        assert!(extract_bearer(&headers).is_err());

        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer(&headers).is_err());

        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer "));
        assert!(extract_bearer(&headers).is_err());
    }
}
