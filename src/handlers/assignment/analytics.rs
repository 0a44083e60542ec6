use axum::extract::{Path, State};

use crate::handlers::ServiceState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::analytics_service::{AnalyticsService, InstructorDashboard, StudentSummary};

/// GET /api/analytics/instructors/:instructor_id/dashboard
pub async fn instructor_dashboard_get(
    State(state): State<ServiceState>,
    Path(instructor_id): Path<i32>,
) -> ApiResult<InstructorDashboard> {
    let service = AnalyticsService::new(state.pool.clone());
    let dashboard = service.instructor_dashboard(instructor_id).await?;
    Ok(ApiResponse::success(dashboard))
}

/// GET /api/analytics/students/:student_id/summary
pub async fn student_summary_get(
    State(state): State<ServiceState>,
    Path(student_id): Path<i32>,
) -> ApiResult<StudentSummary> {
    let service = AnalyticsService::new(state.pool.clone());
    let summary = service.student_summary(student_id).await?;
    Ok(ApiResponse::success(summary))
}
