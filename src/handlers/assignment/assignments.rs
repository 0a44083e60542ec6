use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::database::models::{Assignment, AssignmentStatus, ContentType};
use crate::error::ApiError;
use crate::handlers::ServiceState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::pagination::{PageParams, PageQuery, Paginated};
use crate::services::assignment_service::{
    AssignmentChanges, AssignmentFilter, AssignmentService, NewAssignment,
};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateAssignmentRequest {
    pub instructor_id: i32,
    pub student_id: i32,
    pub content_type: ContentType,
    pub content_id: String,
    pub content_title: String,
    pub title: String,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

/// POST /api/assignments - create an assignment, always 201 on success
pub async fn assignment_post(
    State(state): State<ServiceState>,
    Json(payload): Json<CreateAssignmentRequest>,
) -> ApiResult<Assignment> {
    let mut field_errors = HashMap::new();
    if payload.title.trim().is_empty() {
        field_errors.insert("title".to_string(), "This field is required".to_string());
    }
    if payload.content_id.trim().is_empty() {
        field_errors.insert("content_id".to_string(), "This field is required".to_string());
    }
    if payload.instructor_id < 1 {
        field_errors.insert(
            "instructor_id".to_string(),
            "Must be a positive user id".to_string(),
        );
    }
    if payload.student_id < 1 {
        field_errors.insert(
            "student_id".to_string(),
            "Must be a positive user id".to_string(),
        );
    }
    if !field_errors.is_empty() {
        return Err(ApiError::validation_error(
            "Invalid assignment payload",
            Some(field_errors),
        ));
    }

    let service = AssignmentService::new(state.pool.clone());
    let assignment = service
        .create(NewAssignment {
            instructor_id: payload.instructor_id,
            student_id: payload.student_id,
            content_type: payload.content_type,
            content_id: payload.content_id,
            content_title: payload.content_title,
            title: payload.title,
            description: payload.description,
            instructions: payload.instructions,
            due_date: payload.due_date,
        })
        .await?;

    Ok(ApiResponse::created(assignment))
}

/// GET /api/assignments/status - smoke-test status with a sample record
pub async fn status_get(State(state): State<ServiceState>) -> Json<Value> {
    let service = AssignmentService::new(state.pool.clone());
    match service.sample().await {
        Ok(Some(assignment)) => Json(json!({
            "service": "assignment-service",
            "status": "healthy",
            "sample_assignment": {
                "id": assignment.id,
                "title": assignment.title,
                "status": assignment.status,
                "created_at": assignment.created_at,
            },
            "message": "Service is operational"
        })),
        Ok(None) => Json(json!({
            "service": "assignment-service",
            "status": "healthy",
            "message": "No assignments found"
        })),
        Err(e) => {
            tracing::error!("assignment status probe failed: {}", e);
            Json(json!({
                "service": "assignment-service",
                "status": "error"
            }))
        }
    }
}

/// GET /api/assignments/:id
pub async fn assignment_get(
    State(state): State<ServiceState>,
    Path(id): Path<i32>,
) -> ApiResult<Assignment> {
    let service = AssignmentService::new(state.pool.clone());
    let assignment = service.get(id).await?;
    Ok(ApiResponse::success(
        assignment.with_derived_status(Utc::now()),
    ))
}

#[derive(Debug, Deserialize)]
pub struct AssignmentsQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub student_id: Option<i32>,
    pub instructor_id: Option<i32>,
    pub status: Option<AssignmentStatus>,
}

/// GET /api/assignments - paginated listing, newest first
pub async fn assignments_get(
    State(state): State<ServiceState>,
    Query(query): Query<AssignmentsQuery>,
) -> ApiResult<Paginated<Assignment>> {
    let params = PageParams::from_query(
        PageQuery {
            page: query.page,
            size: query.size,
        },
        &state.config.pagination,
    )?;
    let filter = AssignmentFilter {
        student_id: query.student_id,
        instructor_id: query.instructor_id,
        status: query.status,
    };

    let service = AssignmentService::new(state.pool.clone());
    let (assignments, total) = service.list(params, &filter).await?;

    let now = Utc::now();
    let assignments = assignments
        .into_iter()
        .map(|a| a.with_derived_status(now))
        .collect();

    Ok(ApiResponse::success(Paginated::new(
        assignments,
        total,
        params,
    )))
}

#[derive(Debug, Deserialize)]
pub struct StatusFilterQuery {
    pub status: Option<AssignmentStatus>,
}

/// GET /api/assignments/instructors/:instructor_id - all of one
/// instructor's assignments
pub async fn instructor_assignments_get(
    State(state): State<ServiceState>,
    Path(instructor_id): Path<i32>,
    Query(query): Query<StatusFilterQuery>,
) -> ApiResult<Vec<Assignment>> {
    let service = AssignmentService::new(state.pool.clone());
    let assignments = service
        .list_for_instructor(instructor_id, query.status)
        .await?;

    let now = Utc::now();
    Ok(ApiResponse::success(
        assignments
            .into_iter()
            .map(|a| a.with_derived_status(now))
            .collect(),
    ))
}

/// GET /api/assignments/students/:student_id - all of one student's
/// assignments
pub async fn student_assignments_get(
    State(state): State<ServiceState>,
    Path(student_id): Path<i32>,
    Query(query): Query<StatusFilterQuery>,
) -> ApiResult<Vec<Assignment>> {
    let service = AssignmentService::new(state.pool.clone());
    let assignments = service.list_for_student(student_id, query.status).await?;

    let now = Utc::now();
    Ok(ApiResponse::success(
        assignments
            .into_iter()
            .map(|a| a.with_derived_status(now))
            .collect(),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateAssignmentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: Option<AssignmentStatus>,
}

/// PUT /api/assignments/:id - partial update; status changes go through the
/// state machine
pub async fn assignment_put(
    State(state): State<ServiceState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateAssignmentRequest>,
) -> ApiResult<Assignment> {
    let service = AssignmentService::new(state.pool.clone());
    let assignment = service
        .update(
            id,
            AssignmentChanges {
                title: payload.title,
                description: payload.description,
                instructions: payload.instructions,
                due_date: payload.due_date,
                status: payload.status,
            },
        )
        .await?;
    Ok(ApiResponse::success(
        assignment.with_derived_status(Utc::now()),
    ))
}

/// DELETE /api/assignments/:id - soft delete
pub async fn assignment_delete(
    State(state): State<ServiceState>,
    Path(id): Path<i32>,
) -> ApiResult<Value> {
    let service = AssignmentService::new(state.pool.clone());
    service.soft_delete(id).await?;
    Ok(ApiResponse::success(
        json!({ "message": "Assignment deleted successfully" }),
    ))
}
