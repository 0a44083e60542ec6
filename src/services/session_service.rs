use sqlx::PgPool;

use crate::database::models::{AssignmentStatus, StudySession};
use crate::services::assignment_service::AssignmentError;

const SESSION_COLUMNS: &str = "id, assignment_id, student_id, started_at, ended_at, \
                               items_studied, items_completed, session_notes, duration_minutes";

#[derive(Debug, Default)]
pub struct SessionProgressUpdate {
    pub items_studied: Option<i32>,
    pub items_completed: Option<i32>,
    pub session_notes: Option<String>,
}

pub struct SessionService {
    pool: PgPool,
}

impl SessionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a study session against an active assignment. Starting the first
    /// session moves a pending assignment to in_progress.
    pub async fn start(
        &self,
        assignment_id: i32,
        student_id: i32,
    ) -> Result<StudySession, AssignmentError> {
        let mut tx = self.pool.begin().await?;

        let status: Option<(AssignmentStatus,)> =
            sqlx::query_as("SELECT status FROM assignments WHERE id = $1 AND is_active = TRUE")
                .bind(assignment_id)
                .fetch_optional(&mut *tx)
                .await?;
        let (status,) = status.ok_or(AssignmentError::NotFound)?;

        let sql = format!(
            "INSERT INTO study_sessions (assignment_id, student_id, started_at, \
                                         items_studied, items_completed) \
             VALUES ($1, $2, NOW(), 0, 0) RETURNING {SESSION_COLUMNS}"
        );
        let session = sqlx::query_as::<_, StudySession>(&sql)
            .bind(assignment_id)
            .bind(student_id)
            .fetch_one(&mut *tx)
            .await?;

        if status == AssignmentStatus::Pending {
            sqlx::query(
                "UPDATE assignments SET status = 'in_progress', updated_at = NOW() WHERE id = $1",
            )
            .bind(assignment_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::info!("started study session {} on assignment {}", session.id, assignment_id);
        Ok(session)
    }

    pub async fn update_progress(
        &self,
        session_id: i32,
        update: SessionProgressUpdate,
    ) -> Result<StudySession, AssignmentError> {
        let session = self.get(session_id).await?;
        if !session.is_open() {
            return Err(AssignmentError::SessionClosed);
        }

        let sql = format!(
            "UPDATE study_sessions SET \
                items_studied = COALESCE($2, items_studied), \
                items_completed = COALESCE($3, items_completed), \
                session_notes = COALESCE($4, session_notes) \
             WHERE id = $1 RETURNING {SESSION_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, StudySession>(&sql)
            .bind(session_id)
            .bind(update.items_studied)
            .bind(update.items_completed)
            .bind(&update.session_notes)
            .fetch_one(&self.pool)
            .await?)
    }

    /// Close a session: stamp `ended_at` and derive the duration. Closing an
    /// already-closed session is a conflict, which also keeps
    /// `ended_at >= started_at` trivially true.
    pub async fn end(
        &self,
        session_id: i32,
        items_studied: Option<i32>,
    ) -> Result<StudySession, AssignmentError> {
        let session = self.get(session_id).await?;
        if !session.is_open() {
            return Err(AssignmentError::SessionClosed);
        }

        let sql = format!(
            "UPDATE study_sessions SET \
                ended_at = NOW(), \
                items_studied = COALESCE($2, items_studied), \
                duration_minutes = \
                    GREATEST(0, FLOOR(EXTRACT(EPOCH FROM (NOW() - started_at)) / 60))::int \
             WHERE id = $1 RETURNING {SESSION_COLUMNS}"
        );
        let session = sqlx::query_as::<_, StudySession>(&sql)
            .bind(session_id)
            .bind(items_studied)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(
            "ended study session {} after {} minutes",
            session.id,
            session.duration_minutes.unwrap_or(0)
        );
        Ok(session)
    }

    pub async fn get(&self, session_id: i32) -> Result<StudySession, AssignmentError> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM study_sessions WHERE id = $1");
        sqlx::query_as::<_, StudySession>(&sql)
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AssignmentError::SessionNotFound)
    }

    pub async fn list_for_assignment(
        &self,
        assignment_id: i32,
    ) -> Result<Vec<StudySession>, AssignmentError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM assignments WHERE id = $1 AND is_active = TRUE")
                .bind(assignment_id)
                .fetch_one(&self.pool)
                .await?;
        if count == 0 {
            return Err(AssignmentError::NotFound);
        }

        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM study_sessions \
             WHERE assignment_id = $1 ORDER BY started_at DESC"
        );
        Ok(sqlx::query_as::<_, StudySession>(&sql)
            .bind(assignment_id)
            .fetch_all(&self.pool)
            .await?)
    }
}
