use axum::extract::{Extension, Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::database::models::{User, UserRole};
use crate::error::ApiError;
use crate::handlers::ServiceState;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::pagination::{PageParams, PageQuery, Paginated};
use crate::services::user_service::{UserChanges, UserFilter, UserService};

use super::utils::{validate_email, validate_password};

#[derive(Debug, Deserialize)]
pub struct UsersQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub role: Option<UserRole>,
    pub search: Option<String>,
}

/// GET /api/v1/users - paginated user listing with role/search filters
pub async fn users_get(
    State(state): State<ServiceState>,
    Query(query): Query<UsersQuery>,
) -> ApiResult<Paginated<User>> {
    let page_query = PageQuery {
        page: query.page,
        size: query.size,
    };
    let params = PageParams::from_query(page_query, &state.config.pagination)?;
    let filter = UserFilter {
        role: query.role,
        search: query.search,
    };

    let service = UserService::new(state.pool.clone());
    let (users, total) = service.list(params, &filter).await?;

    Ok(ApiResponse::success(Paginated::new(users, total, params)))
}

/// GET /api/v1/users/me - the authenticated caller's record
pub async fn me_get(
    State(state): State<ServiceState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<User> {
    let service = UserService::new(state.pool.clone());
    let user = service.get(auth_user.user_id).await?;
    Ok(ApiResponse::success(user))
}

/// GET /api/v1/users/:id
pub async fn user_get(
    State(state): State<ServiceState>,
    Path(id): Path<i32>,
) -> ApiResult<User> {
    let service = UserService::new(state.pool.clone());
    let user = service.get(id).await?;
    Ok(ApiResponse::success(user))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub password: Option<String>,
    pub role: Option<UserRole>,
}

/// PUT /api/v1/users/:id - partial update; only provided fields change
pub async fn user_put(
    State(state): State<ServiceState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<User> {
    let mut field_errors = HashMap::new();
    if let Some(ref email) = payload.email {
        if let Some(msg) = validate_email(email) {
            field_errors.insert("email".to_string(), msg);
        }
    }
    if let Some(ref password) = payload.password {
        if let Some(msg) = validate_password(password) {
            field_errors.insert("password".to_string(), msg);
        }
    }
    if !field_errors.is_empty() {
        return Err(ApiError::validation_error(
            "Invalid user update payload",
            Some(field_errors),
        ));
    }

    let service = UserService::new(state.pool.clone());
    let user = service
        .update(
            id,
            UserChanges {
                email: payload.email,
                full_name: payload.full_name,
                password: payload.password,
                role: payload.role,
            },
            &state.config.security,
        )
        .await?;

    Ok(ApiResponse::success(user))
}

/// DELETE /api/v1/users/:id - soft delete
pub async fn user_delete(
    State(state): State<ServiceState>,
    Path(id): Path<i32>,
) -> ApiResult<Value> {
    let service = UserService::new(state.pool.clone());
    service.soft_delete(id).await?;
    Ok(ApiResponse::success(
        json!({ "message": "User deleted successfully" }),
    ))
}
