use serde::Serialize;
use sqlx::PgPool;

use crate::services::assignment_service::AssignmentError;

#[derive(Debug, Serialize)]
pub struct AssignmentCounts {
    pub total: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub completed: i64,
}

#[derive(Debug, Serialize)]
pub struct InstructorDashboard {
    pub instructor_id: i32,
    pub assignments: AssignmentCounts,
    pub students: i64,
    pub average_completion: f64,
}

#[derive(Debug, Serialize)]
pub struct StudentSummary {
    pub student_id: i32,
    pub assignments: AssignmentCounts,
    pub average_completion: f64,
    pub total_study_minutes: i64,
}

/// Read-only aggregates over assignments, progress and study sessions.
pub struct AnalyticsService {
    pool: PgPool,
}

impl AnalyticsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn instructor_dashboard(
        &self,
        instructor_id: i32,
    ) -> Result<InstructorDashboard, AssignmentError> {
        let (total, pending, in_progress, completed, students): (i64, i64, i64, i64, i64) =
            sqlx::query_as(
                "SELECT COUNT(*), \
                        COUNT(*) FILTER (WHERE status = 'pending'), \
                        COUNT(*) FILTER (WHERE status = 'in_progress'), \
                        COUNT(*) FILTER (WHERE status = 'completed'), \
                        COUNT(DISTINCT student_id) \
                 FROM assignments WHERE instructor_id = $1 AND is_active = TRUE",
            )
            .bind(instructor_id)
            .fetch_one(&self.pool)
            .await?;

        let (average_completion,): (f64,) = sqlx::query_as(
            "SELECT COALESCE(AVG(p.completion_percentage), 0) \
             FROM progress p \
             JOIN assignments a ON a.id = p.assignment_id \
             WHERE a.instructor_id = $1 AND a.is_active = TRUE",
        )
        .bind(instructor_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(InstructorDashboard {
            instructor_id,
            assignments: AssignmentCounts {
                total,
                pending,
                in_progress,
                completed,
            },
            students,
            average_completion,
        })
    }

    pub async fn student_summary(
        &self,
        student_id: i32,
    ) -> Result<StudentSummary, AssignmentError> {
        let (total, pending, in_progress, completed): (i64, i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), \
                    COUNT(*) FILTER (WHERE status = 'pending'), \
                    COUNT(*) FILTER (WHERE status = 'in_progress'), \
                    COUNT(*) FILTER (WHERE status = 'completed') \
             FROM assignments WHERE student_id = $1 AND is_active = TRUE",
        )
        .bind(student_id)
        .fetch_one(&self.pool)
        .await?;

        let (average_completion,): (f64,) = sqlx::query_as(
            "SELECT COALESCE(AVG(p.completion_percentage), 0) \
             FROM progress p \
             JOIN assignments a ON a.id = p.assignment_id \
             WHERE a.student_id = $1 AND a.is_active = TRUE",
        )
        .bind(student_id)
        .fetch_one(&self.pool)
        .await?;

        // Only closed sessions have a duration
        let (total_study_minutes,): (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(s.duration_minutes), 0)::bigint \
             FROM study_sessions s \
             JOIN assignments a ON a.id = s.assignment_id \
             WHERE s.student_id = $1 AND a.is_active = TRUE",
        )
        .bind(student_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(StudentSummary {
            student_id,
            assignments: AssignmentCounts {
                total,
                pending,
                in_progress,
                completed,
            },
            average_completion,
            total_study_minutes,
        })
    }
}
