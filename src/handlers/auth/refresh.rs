use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::{access_token_ttl_secs, decode_token, generate_token, TokenType};
use crate::error::ApiError;
use crate::handlers::ServiceState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::user_service::UserService;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

/// POST /api/v1/auth/refresh - exchange a refresh token for a new access
/// token. The account is re-checked so a disabled user cannot keep minting
/// tokens.
pub async fn refresh_post(
    State(state): State<ServiceState>,
    Json(payload): Json<RefreshRequest>,
) -> ApiResult<RefreshResponse> {
    let security = &state.config.security;

    let claims = decode_token(&payload.refresh_token, TokenType::Refresh, security)
        .map_err(|e| ApiError::unauthorized(e.to_string()))?;

    let service = UserService::new(state.pool.clone());
    let user = service.get(claims.sub).await?;

    let access_token = generate_token(&user, TokenType::Access, security)
        .map_err(|e| ApiError::internal_server_error(e.to_string()))?;

    Ok(ApiResponse::success(RefreshResponse {
        access_token,
        token_type: "bearer",
        expires_in: access_token_ttl_secs(security),
    }))
}
