use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::{access_token_ttl_secs, generate_token, TokenType};
use crate::database::models::User;
use crate::error::ApiError;
use crate::handlers::ServiceState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::user_service::UserService;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: User,
}

/// POST /api/v1/auth/login - verify credentials and issue a token pair
pub async fn login_post(
    State(state): State<ServiceState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    if payload.username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("username and password are required"));
    }

    let service = UserService::new(state.pool.clone());
    let user = service
        .authenticate(&payload.username, &payload.password)
        .await?;

    let security = &state.config.security;
    let access_token = generate_token(&user, TokenType::Access, security)
        .map_err(|e| ApiError::internal_server_error(e.to_string()))?;
    let refresh_token = generate_token(&user, TokenType::Refresh, security)
        .map_err(|e| ApiError::internal_server_error(e.to_string()))?;

    Ok(ApiResponse::success(LoginResponse {
        access_token,
        refresh_token,
        token_type: "bearer",
        expires_in: access_token_ttl_secs(security),
        user,
    }))
}
