use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// What kind of content an assignment points at. The content id itself is an
/// opaque string owned by the content service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ContentType {
    Course,
    Deck,
}

/// Assignment lifecycle. Stored status only ever holds pending, in_progress
/// or completed; overdue is derived from the due date at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Pending,
    InProgress,
    Completed,
    Overdue,
}

impl AssignmentStatus {
    /// Explicit transitions a client may request: pending -> in_progress ->
    /// completed. Setting the current status again is a no-op, not an error.
    pub fn can_transition_to(self, next: AssignmentStatus) -> bool {
        use AssignmentStatus::*;
        matches!(
            (self, next),
            (Pending, Pending)
                | (Pending, InProgress)
                | (InProgress, InProgress)
                | (InProgress, Completed)
                | (Completed, Completed)
        )
    }
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AssignmentStatus::Pending => "pending",
            AssignmentStatus::InProgress => "in_progress",
            AssignmentStatus::Completed => "completed",
            AssignmentStatus::Overdue => "overdue",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Assignment {
    pub id: i32,
    pub instructor_id: i32,
    pub student_id: i32,
    pub content_type: ContentType,
    pub content_id: String,
    pub content_title: String,
    pub title: String,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub status: AssignmentStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Assignment {
    /// Status as reported to clients: overdue once the due date has passed
    /// and the assignment was never completed.
    pub fn effective_status(&self, now: DateTime<Utc>) -> AssignmentStatus {
        match self.due_date {
            Some(due) if due < now && self.status != AssignmentStatus::Completed => {
                AssignmentStatus::Overdue
            }
            _ => self.status,
        }
    }

    pub fn with_derived_status(mut self, now: DateTime<Utc>) -> Self {
        self.status = self.effective_status(now);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn assignment(status: AssignmentStatus, due_date: Option<DateTime<Utc>>) -> Assignment {
        Assignment {
            id: 1,
            instructor_id: 1,
            student_id: 5,
            content_type: ContentType::Course,
            content_id: "X".to_string(),
            content_title: "T".to_string(),
            title: "T".to_string(),
            description: None,
            instructions: None,
            status,
            due_date,
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn forward_transitions_are_allowed() {
        use AssignmentStatus::*;
        assert!(Pending.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Pending));
    }

    #[test]
    fn backward_and_skipping_transitions_are_rejected() {
        use AssignmentStatus::*;
        assert!(!Pending.can_transition_to(Completed));
        assert!(!InProgress.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(InProgress));
        assert!(!Completed.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Overdue));
        assert!(!InProgress.can_transition_to(Overdue));
    }

    #[test]
    fn past_due_derives_overdue() {
        let now = Utc::now();
        let past = Some(now - Duration::days(1));

        let a = assignment(AssignmentStatus::InProgress, past);
        assert_eq!(a.effective_status(now), AssignmentStatus::Overdue);

        let a = assignment(AssignmentStatus::Pending, past);
        assert_eq!(a.effective_status(now), AssignmentStatus::Overdue);
    }

    #[test]
    fn completed_never_reads_overdue() {
        let now = Utc::now();
        let a = assignment(AssignmentStatus::Completed, Some(now - Duration::days(1)));
        assert_eq!(a.effective_status(now), AssignmentStatus::Completed);
    }

    #[test]
    fn future_or_missing_due_date_keeps_stored_status() {
        let now = Utc::now();
        let a = assignment(AssignmentStatus::Pending, Some(now + Duration::days(7)));
        assert_eq!(a.effective_status(now), AssignmentStatus::Pending);

        let a = assignment(AssignmentStatus::InProgress, None);
        assert_eq!(a.effective_status(now), AssignmentStatus::InProgress);
    }
}
