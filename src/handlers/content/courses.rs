use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::models::Course;
use crate::error::ApiError;
use crate::handlers::ServiceState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::pagination::{PageParams, PageQuery, Paginated};
use crate::services::course_service::{CourseChanges, CourseFilter, CourseService, NewCourse};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCourseRequest {
    pub instructor_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

/// POST /api/v1/courses - create a course
pub async fn course_post(
    State(state): State<ServiceState>,
    Json(payload): Json<CreateCourseRequest>,
) -> ApiResult<Course> {
    let mut field_errors = HashMap::new();
    if payload.title.trim().is_empty() {
        field_errors.insert("title".to_string(), "This field is required".to_string());
    }
    if payload.instructor_id < 1 {
        field_errors.insert(
            "instructor_id".to_string(),
            "Must be a positive user id".to_string(),
        );
    }
    if !field_errors.is_empty() {
        return Err(ApiError::validation_error(
            "Invalid course payload",
            Some(field_errors),
        ));
    }

    let service = CourseService::new(state.pool.clone());
    let course = service
        .create_course(NewCourse {
            instructor_id: payload.instructor_id,
            title: payload.title,
            description: payload.description,
            category: payload.category,
            is_published: payload.is_published,
        })
        .await?;

    Ok(ApiResponse::created(course))
}

#[derive(Debug, Deserialize)]
pub struct CoursesQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub instructor_id: Option<i32>,
    pub search: Option<String>,
    pub is_published: Option<bool>,
}

/// GET /api/v1/courses - paginated course listing
pub async fn courses_get(
    State(state): State<ServiceState>,
    Query(query): Query<CoursesQuery>,
) -> ApiResult<Paginated<Course>> {
    let params = PageParams::from_query(
        PageQuery {
            page: query.page,
            size: query.size,
        },
        &state.config.pagination,
    )?;
    let filter = CourseFilter {
        instructor_id: query.instructor_id,
        search: query.search,
        is_published: query.is_published,
    };

    let service = CourseService::new(state.pool.clone());
    let (courses, total) = service.list_courses(params, &filter).await?;

    Ok(ApiResponse::success(Paginated::new(courses, total, params)))
}

/// GET /api/v1/courses/status - smoke-test status with a sample record
pub async fn status_get(State(state): State<ServiceState>) -> Json<Value> {
    let service = CourseService::new(state.pool.clone());
    match service.sample_course().await {
        Ok(Some(course)) => Json(json!({
            "service": "content-service",
            "status": "healthy",
            "sample_course": {
                "id": course.id,
                "title": course.title,
                "lesson_count": course.lesson_count,
                "created_at": course.created_at,
            },
            "message": "Service is operational"
        })),
        Ok(None) => Json(json!({
            "service": "content-service",
            "status": "healthy",
            "message": "No courses found"
        })),
        Err(e) => {
            tracing::error!("course status probe failed: {}", e);
            Json(json!({
                "service": "content-service",
                "status": "error"
            }))
        }
    }
}

/// GET /api/v1/courses/:id
pub async fn course_get(
    State(state): State<ServiceState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Course> {
    let service = CourseService::new(state.pool.clone());
    let course = service.get_course(id).await?;
    Ok(ApiResponse::success(course))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_published: Option<bool>,
}

/// PUT /api/v1/courses/:id - partial update
pub async fn course_put(
    State(state): State<ServiceState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCourseRequest>,
) -> ApiResult<Course> {
    let service = CourseService::new(state.pool.clone());
    let course = service
        .update_course(
            id,
            CourseChanges {
                title: payload.title,
                description: payload.description,
                category: payload.category,
                is_published: payload.is_published,
            },
        )
        .await?;
    Ok(ApiResponse::success(course))
}

/// DELETE /api/v1/courses/:id - soft delete with cascade
pub async fn course_delete(
    State(state): State<ServiceState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    let service = CourseService::new(state.pool.clone());
    service.delete_course(id).await?;
    Ok(ApiResponse::success(
        json!({ "message": "Course deleted successfully" }),
    ))
}
