use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Per-assignment progress record, one-to-one with the assignment.
/// `completion_percentage` is always derived from the item counts; it is
/// recomputed on every update and never trusted from the client.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Progress {
    pub id: i32,
    pub assignment_id: i32,
    pub student_id: i32,
    pub total_items: i32,
    pub completed_items: i32,
    pub completion_percentage: f64,
    pub items_studied: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Progress {
    pub fn completion_percentage(total_items: i32, completed_items: i32) -> f64 {
        if total_items <= 0 {
            0.0
        } else {
            completed_items as f64 / total_items as f64 * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_is_ratio_of_items() {
        assert_eq!(Progress::completion_percentage(10, 3), 30.0);
        assert_eq!(Progress::completion_percentage(10, 10), 100.0);
        assert_eq!(Progress::completion_percentage(3, 1), 1.0 / 3.0 * 100.0);
    }

    #[test]
    fn zero_total_is_zero_percent() {
        assert_eq!(Progress::completion_percentage(0, 0), 0.0);
        assert_eq!(Progress::completion_percentage(0, 5), 0.0);
    }
}
