use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use std::collections::HashMap;

use crate::database::models::{User, UserRole};
use crate::error::ApiError;
use crate::handlers::ServiceState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::user_service::{NewUser, UserService};

use super::utils::{validate_email, validate_password, validate_username};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: UserRole,
}

fn default_role() -> UserRole {
    UserRole::Student
}

/// POST /api/v1/auth/register - create a new account
pub async fn register_post(
    State(state): State<ServiceState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<User> {
    let mut field_errors = HashMap::new();
    if let Some(msg) = validate_username(&payload.username) {
        field_errors.insert("username".to_string(), msg);
    }
    if let Some(msg) = validate_email(&payload.email) {
        field_errors.insert("email".to_string(), msg);
    }
    if let Some(msg) = validate_password(&payload.password) {
        field_errors.insert("password".to_string(), msg);
    }
    if !field_errors.is_empty() {
        return Err(ApiError::validation_error(
            "Invalid registration payload",
            Some(field_errors),
        ));
    }

    let service = UserService::new(state.pool.clone());
    let user = service
        .register(
            NewUser {
                username: payload.username,
                email: payload.email,
                full_name: payload.full_name,
                password: payload.password,
                role: payload.role,
            },
            &state.config.security,
        )
        .await?;

    Ok(ApiResponse::created(user))
}
