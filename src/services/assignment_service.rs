use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::database::models::{Assignment, AssignmentStatus, ContentType, Progress};
use crate::pagination::PageParams;

const ASSIGNMENT_COLUMNS: &str =
    "id, instructor_id, student_id, content_type, content_id, content_title, title, \
     description, instructions, status, due_date, is_active, created_at, updated_at";
const PROGRESS_COLUMNS: &str = "id, assignment_id, student_id, total_items, completed_items, \
                                completion_percentage, items_studied, created_at, updated_at";

#[derive(Debug, thiserror::Error)]
pub enum AssignmentError {
    #[error("assignment not found")]
    NotFound,
    #[error("no progress recorded for assignment {0}")]
    ProgressNotFound(i32),
    #[error("study session not found")]
    SessionNotFound,
    #[error("study session already ended")]
    SessionClosed,
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: AssignmentStatus,
        to: AssignmentStatus,
    },
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

#[derive(Debug)]
pub struct NewAssignment {
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

#[derive(Debug, Default)]
pub struct AssignmentChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: Option<AssignmentStatus>,
}

#[derive(Debug, Default)]
pub struct AssignmentFilter {
    pub student_id: Option<i32>,
    pub instructor_id: Option<i32>,
    pub status: Option<AssignmentStatus>,
}

#[derive(Debug, Default)]
pub struct ProgressUpdate {
    pub total_items: Option<i32>,
    pub completed_items: Option<i32>,
    pub items_studied: Option<i32>,
}

pub struct AssignmentService {
    pool: PgPool,
}

impl AssignmentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an assignment plus its zeroed progress record in one
    /// transaction, so progress reads never 404 for a live assignment.
    pub async fn create(&self, new: NewAssignment) -> Result<Assignment, AssignmentError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO assignments \
                (instructor_id, student_id, content_type, content_id, content_title, \
                 title, description, instructions, status, due_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending', $9) \
             RETURNING {ASSIGNMENT_COLUMNS}"
        );
        let assignment = sqlx::query_as::<_, Assignment>(&sql)
            .bind(new.instructor_id)
            .bind(new.student_id)
            .bind(new.content_type)
            .bind(&new.content_id)
            .bind(&new.content_title)
            .bind(&new.title)
            .bind(&new.description)
            .bind(&new.instructions)
            .bind(new.due_date)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO progress (assignment_id, student_id, total_items, completed_items, \
                                   completion_percentage, items_studied) \
             VALUES ($1, $2, 0, 0, 0, 0)",
        )
        .bind(assignment.id)
        .bind(assignment.student_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!("created assignment {} for student {}", assignment.id, assignment.student_id);
        Ok(assignment)
    }

    pub async fn get(&self, id: i32) -> Result<Assignment, AssignmentError> {
        let sql = format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE id = $1 AND is_active = TRUE"
        );
        sqlx::query_as::<_, Assignment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AssignmentError::NotFound)
    }

    pub async fn list(
        &self,
        params: PageParams,
        filter: &AssignmentFilter,
    ) -> Result<(Vec<Assignment>, i64), AssignmentError> {
        let where_clause = "WHERE is_active = TRUE \
             AND ($1::int IS NULL OR student_id = $1) \
             AND ($2::int IS NULL OR instructor_id = $2) \
             AND ($3::text IS NULL OR status = $3)";
        let status = filter.status.map(|s| s.to_string());

        let sql = format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM assignments {where_clause} \
             ORDER BY created_at DESC LIMIT $4 OFFSET $5"
        );
        let assignments = sqlx::query_as::<_, Assignment>(&sql)
            .bind(filter.student_id)
            .bind(filter.instructor_id)
            .bind(&status)
            .bind(params.size)
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await?;

        let sql = format!("SELECT COUNT(*) FROM assignments {where_clause}");
        let (total,): (i64,) = sqlx::query_as(&sql)
            .bind(filter.student_id)
            .bind(filter.instructor_id)
            .bind(&status)
            .fetch_one(&self.pool)
            .await?;

        Ok((assignments, total))
    }

    pub async fn list_for_instructor(
        &self,
        instructor_id: i32,
        status: Option<AssignmentStatus>,
    ) -> Result<Vec<Assignment>, AssignmentError> {
        let sql = format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM assignments \
             WHERE instructor_id = $1 AND is_active = TRUE \
               AND ($2::text IS NULL OR status = $2) \
             ORDER BY created_at DESC"
        );
        Ok(sqlx::query_as::<_, Assignment>(&sql)
            .bind(instructor_id)
            .bind(status.map(|s| s.to_string()))
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn list_for_student(
        &self,
        student_id: i32,
        status: Option<AssignmentStatus>,
    ) -> Result<Vec<Assignment>, AssignmentError> {
        let sql = format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM assignments \
             WHERE student_id = $1 AND is_active = TRUE \
               AND ($2::text IS NULL OR status = $2) \
             ORDER BY created_at DESC"
        );
        Ok(sqlx::query_as::<_, Assignment>(&sql)
            .bind(student_id)
            .bind(status.map(|s| s.to_string()))
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn update(
        &self,
        id: i32,
        changes: AssignmentChanges,
    ) -> Result<Assignment, AssignmentError> {
        let current = self.get(id).await?;

        // Explicit status changes must follow pending -> in_progress ->
        // completed; overdue is derived and can never be stored.
        if let Some(next) = changes.status {
            if !current.status.can_transition_to(next) {
                return Err(AssignmentError::InvalidTransition {
                    from: current.status,
                    to: next,
                });
            }
        }

        let sql = format!(
            "UPDATE assignments SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                instructions = COALESCE($4, instructions), \
                due_date = COALESCE($5, due_date), \
                status = COALESCE($6, status), \
                updated_at = NOW() \
             WHERE id = $1 AND is_active = TRUE RETURNING {ASSIGNMENT_COLUMNS}"
        );
        sqlx::query_as::<_, Assignment>(&sql)
            .bind(id)
            .bind(&changes.title)
            .bind(&changes.description)
            .bind(&changes.instructions)
            .bind(changes.due_date)
            .bind(changes.status)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AssignmentError::NotFound)
    }

    pub async fn soft_delete(&self, id: i32) -> Result<(), AssignmentError> {
        let result = sqlx::query(
            "UPDATE assignments SET is_active = FALSE, updated_at = NOW() \
             WHERE id = $1 AND is_active = TRUE",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AssignmentError::NotFound);
        }
        Ok(())
    }

    pub async fn get_progress(&self, assignment_id: i32) -> Result<Progress, AssignmentError> {
        // Progress for a deleted assignment is gone too
        self.get(assignment_id).await?;

        let sql = format!("SELECT {PROGRESS_COLUMNS} FROM progress WHERE assignment_id = $1");
        sqlx::query_as::<_, Progress>(&sql)
            .bind(assignment_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AssignmentError::ProgressNotFound(assignment_id))
    }

    /// Apply a progress update. The completion percentage is recomputed from
    /// the item counts, and the assignment status is advanced in the same
    /// transaction: any progress moves pending to in_progress, 100% moves it
    /// to completed.
    pub async fn update_progress(
        &self,
        assignment_id: i32,
        update: ProgressUpdate,
    ) -> Result<Progress, AssignmentError> {
        let assignment = self.get(assignment_id).await?;
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {PROGRESS_COLUMNS} FROM progress WHERE assignment_id = $1");
        let current = sqlx::query_as::<_, Progress>(&sql)
            .bind(assignment_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AssignmentError::ProgressNotFound(assignment_id))?;

        let total_items = update.total_items.unwrap_or(current.total_items);
        let completed_items = update.completed_items.unwrap_or(current.completed_items);
        let items_studied = update.items_studied.unwrap_or(current.items_studied);
        let percentage = Progress::completion_percentage(total_items, completed_items);

        let sql = format!(
            "UPDATE progress SET total_items = $2, completed_items = $3, \
                completion_percentage = $4, items_studied = $5, updated_at = NOW() \
             WHERE assignment_id = $1 RETURNING {PROGRESS_COLUMNS}"
        );
        let progress = sqlx::query_as::<_, Progress>(&sql)
            .bind(assignment_id)
            .bind(total_items)
            .bind(completed_items)
            .bind(percentage)
            .bind(items_studied)
            .fetch_one(&mut *tx)
            .await?;

        let next_status = if percentage >= 100.0 {
            Some(AssignmentStatus::Completed)
        } else if assignment.status == AssignmentStatus::Pending
            && (percentage > 0.0 || items_studied > 0)
        {
            Some(AssignmentStatus::InProgress)
        } else {
            None
        };

        if let Some(status) = next_status.filter(|s| *s != assignment.status) {
            sqlx::query("UPDATE assignments SET status = $2, updated_at = NOW() WHERE id = $1")
                .bind(assignment_id)
                .bind(status)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(progress)
    }

    /// One record for the smoke-test status endpoint, if any exist.
    pub async fn sample(&self) -> Result<Option<Assignment>, AssignmentError> {
        let sql = format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE is_active = TRUE \
             ORDER BY created_at DESC LIMIT 1"
        );
        Ok(sqlx::query_as::<_, Assignment>(&sql)
            .fetch_optional(&self.pool)
            .await?)
    }
}
