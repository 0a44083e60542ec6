// Assignment service routes: assignments, progress, study sessions, and
// analytics, matching the prefixes the gateway forwards.

use axum::{
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};

use crate::handlers::ServiceState;

pub mod analytics;
pub mod assignments;
pub mod progress;
pub mod sessions;

pub fn router(state: ServiceState) -> Router {
    Router::new()
        // Assignments
        .route(
            "/api/assignments",
            get(assignments::assignments_get).post(assignments::assignment_post),
        )
        .route(
            "/api/assignments/",
            get(assignments::assignments_get).post(assignments::assignment_post),
        )
        .route("/api/assignments/status", get(assignments::status_get))
        .route(
            "/api/assignments/instructors/:instructor_id",
            get(assignments::instructor_assignments_get),
        )
        .route(
            "/api/assignments/students/:student_id",
            get(assignments::student_assignments_get),
        )
        .route(
            "/api/assignments/:id",
            get(assignments::assignment_get)
                .put(assignments::assignment_put)
                .delete(assignments::assignment_delete),
        )
        // Progress, one record per assignment
        .route(
            "/api/progress/assignments/:assignment_id",
            get(progress::progress_get).put(progress::progress_put),
        )
        // Study sessions
        .route(
            "/api/sessions/assignments/:assignment_id/start",
            post(sessions::session_start_post),
        )
        .route(
            "/api/sessions/assignments/:assignment_id",
            get(sessions::sessions_get),
        )
        .route(
            "/api/sessions/:id/progress",
            put(sessions::session_progress_put),
        )
        .route("/api/sessions/:id/end", post(sessions::session_end_post))
        // Analytics
        .route(
            "/api/analytics/instructors/:instructor_id/dashboard",
            get(analytics::instructor_dashboard_get),
        )
        .route(
            "/api/analytics/students/:student_id/summary",
            get(analytics::student_summary_get),
        )
        .with_state(state)
}

/// GET / - service directory
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "LMS Assignment Service",
        "version": env!("CARGO_PKG_VERSION"),
        "health": "/health",
        "endpoints": {
            "assignments": "/api/assignments",
            "progress": "/api/progress/assignments/{assignment_id}",
            "sessions": "/api/sessions/assignments/{assignment_id}/start",
            "analytics": "/api/analytics"
        }
    }))
}
