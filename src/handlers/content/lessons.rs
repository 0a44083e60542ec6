use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::models::Lesson;
use crate::error::ApiError;
use crate::handlers::ServiceState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::course_service::{CourseService, LessonChanges, NewLesson};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateLessonRequest {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub position: i32,
}

/// POST /api/v1/courses/:course_id/lessons - create a lesson; the parent
/// course must exist
pub async fn lesson_post(
    State(state): State<ServiceState>,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<CreateLessonRequest>,
) -> ApiResult<Lesson> {
    if payload.title.trim().is_empty() {
        let mut field_errors = HashMap::new();
        field_errors.insert("title".to_string(), "This field is required".to_string());
        return Err(ApiError::validation_error(
            "Invalid lesson payload",
            Some(field_errors),
        ));
    }

    let service = CourseService::new(state.pool.clone());
    let lesson = service
        .create_lesson(
            course_id,
            NewLesson {
                title: payload.title,
                description: payload.description,
                position: payload.position,
            },
        )
        .await?;

    Ok(ApiResponse::created(lesson))
}

/// GET /api/v1/courses/:course_id/lessons - all active lessons, in order
pub async fn lessons_get(
    State(state): State<ServiceState>,
    Path(course_id): Path<Uuid>,
) -> ApiResult<Vec<Lesson>> {
    let service = CourseService::new(state.pool.clone());
    let lessons = service.list_lessons(course_id).await?;
    Ok(ApiResponse::success(lessons))
}

/// GET /api/v1/lessons/:id
pub async fn lesson_get(
    State(state): State<ServiceState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Lesson> {
    let service = CourseService::new(state.pool.clone());
    let lesson = service.get_lesson(id).await?;
    Ok(ApiResponse::success(lesson))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateLessonRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub position: Option<i32>,
}

/// PUT /api/v1/lessons/:id - partial update
pub async fn lesson_put(
    State(state): State<ServiceState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLessonRequest>,
) -> ApiResult<Lesson> {
    let service = CourseService::new(state.pool.clone());
    let lesson = service
        .update_lesson(
            id,
            LessonChanges {
                title: payload.title,
                description: payload.description,
                position: payload.position,
            },
        )
        .await?;
    Ok(ApiResponse::success(lesson))
}

/// DELETE /api/v1/lessons/:id - soft delete with cascade; the parent
/// course's lesson count is recomputed
pub async fn lesson_delete(
    State(state): State<ServiceState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    let service = CourseService::new(state.pool.clone());
    service.delete_lesson(id).await?;
    Ok(ApiResponse::success(
        json!({ "message": "Lesson deleted successfully" }),
    ))
}
