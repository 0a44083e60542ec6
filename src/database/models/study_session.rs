use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One sitting of a student working through an assignment. `ended_at` stays
/// NULL while the session is open; `duration_minutes` is derived when the
/// session is closed and `ended_at >= started_at` always holds.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudySession {
    pub id: i32,
    pub assignment_id: i32,
    pub student_id: i32,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub items_studied: i32,
    pub items_completed: i32,
    pub session_notes: Option<String>,
    pub duration_minutes: Option<i32>,
}

impl StudySession {
    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }
}
