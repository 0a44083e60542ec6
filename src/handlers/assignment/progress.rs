use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use std::collections::HashMap;

use crate::database::models::Progress;
use crate::error::ApiError;
use crate::handlers::ServiceState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::assignment_service::{AssignmentService, ProgressUpdate};

/// GET /api/progress/assignments/:assignment_id
pub async fn progress_get(
    State(state): State<ServiceState>,
    Path(assignment_id): Path<i32>,
) -> ApiResult<Progress> {
    let service = AssignmentService::new(state.pool.clone());
    let progress = service.get_progress(assignment_id).await?;
    Ok(ApiResponse::success(progress))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProgressRequest {
    pub total_items: Option<i32>,
    pub completed_items: Option<i32>,
    pub items_studied: Option<i32>,
    /// Accepted for wire compatibility and ignored: the percentage is always
    /// recomputed from the item counts.
    pub completion_percentage: Option<f64>,
}

/// PUT /api/progress/assignments/:assignment_id - update item counts; the
/// completion percentage is recomputed and the assignment status advanced
/// server-side
pub async fn progress_put(
    State(state): State<ServiceState>,
    Path(assignment_id): Path<i32>,
    Json(payload): Json<UpdateProgressRequest>,
) -> ApiResult<Progress> {
    let mut field_errors = HashMap::new();
    if payload.total_items.is_some_and(|n| n < 0) {
        field_errors.insert("total_items".to_string(), "Must be non-negative".to_string());
    }
    if payload.completed_items.is_some_and(|n| n < 0) {
        field_errors.insert(
            "completed_items".to_string(),
            "Must be non-negative".to_string(),
        );
    }
    if payload.items_studied.is_some_and(|n| n < 0) {
        field_errors.insert(
            "items_studied".to_string(),
            "Must be non-negative".to_string(),
        );
    }
    if !field_errors.is_empty() {
        return Err(ApiError::validation_error(
            "Invalid progress payload",
            Some(field_errors),
        ));
    }

    let service = AssignmentService::new(state.pool.clone());
    let progress = service
        .update_progress(
            assignment_id,
            ProgressUpdate {
                total_items: payload.total_items,
                completed_items: payload.completed_items,
                items_studied: payload.items_studied,
            },
        )
        .await?;

    Ok(ApiResponse::success(progress))
}
