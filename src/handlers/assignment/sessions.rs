use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use std::collections::HashMap;

use crate::database::models::StudySession;
use crate::error::ApiError;
use crate::handlers::ServiceState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::session_service::{SessionProgressUpdate, SessionService};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StartSessionRequest {
    pub student_id: i32,
}

/// POST /api/sessions/assignments/:assignment_id/start - open a study
/// session; a pending assignment moves to in_progress
pub async fn session_start_post(
    State(state): State<ServiceState>,
    Path(assignment_id): Path<i32>,
    Json(payload): Json<StartSessionRequest>,
) -> ApiResult<StudySession> {
    if payload.student_id < 1 {
        let mut field_errors = HashMap::new();
        field_errors.insert(
            "student_id".to_string(),
            "Must be a positive user id".to_string(),
        );
        return Err(ApiError::validation_error(
            "Invalid session payload",
            Some(field_errors),
        ));
    }

    let service = SessionService::new(state.pool.clone());
    let session = service.start(assignment_id, payload.student_id).await?;
    Ok(ApiResponse::created(session))
}

/// GET /api/sessions/assignments/:assignment_id - session history, newest
/// first
pub async fn sessions_get(
    State(state): State<ServiceState>,
    Path(assignment_id): Path<i32>,
) -> ApiResult<Vec<StudySession>> {
    let service = SessionService::new(state.pool.clone());
    let sessions = service.list_for_assignment(assignment_id).await?;
    Ok(ApiResponse::success(sessions))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionProgressRequest {
    pub items_studied: Option<i32>,
    pub items_completed: Option<i32>,
    pub session_notes: Option<String>,
}

/// PUT /api/sessions/:id/progress - update an open session
pub async fn session_progress_put(
    State(state): State<ServiceState>,
    Path(id): Path<i32>,
    Json(payload): Json<SessionProgressRequest>,
) -> ApiResult<StudySession> {
    let service = SessionService::new(state.pool.clone());
    let session = service
        .update_progress(
            id,
            SessionProgressUpdate {
                items_studied: payload.items_studied,
                items_completed: payload.items_completed,
                session_notes: payload.session_notes,
            },
        )
        .await?;
    Ok(ApiResponse::success(session))
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct EndSessionRequest {
    pub items_studied: Option<i32>,
}

/// POST /api/sessions/:id/end - close a session and derive its duration
pub async fn session_end_post(
    State(state): State<ServiceState>,
    Path(id): Path<i32>,
    payload: Option<Json<EndSessionRequest>>,
) -> ApiResult<StudySession> {
    let items_studied = payload.and_then(|Json(p)| p.items_studied);

    let service = SessionService::new(state.pool.clone());
    let session = service.end(id, items_studied).await?;
    Ok(ApiResponse::success(session))
}
