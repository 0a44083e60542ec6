use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::models::{Course, Lesson};
use crate::pagination::PageParams;
use crate::services::ContentError;

const COURSE_COLUMNS: &str = "id, instructor_id, title, description, category, is_published, \
                              is_active, lesson_count, created_at, updated_at";
const LESSON_COLUMNS: &str =
    "id, course_id, title, description, position, is_active, created_at, updated_at";

#[derive(Debug)]
pub struct NewCourse {
    pub instructor_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_published: bool,
}

#[derive(Debug, Default)]
pub struct CourseChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Default)]
pub struct CourseFilter {
    pub instructor_id: Option<i32>,
    pub search: Option<String>,
    pub is_published: Option<bool>,
}

#[derive(Debug)]
pub struct NewLesson {
    pub title: String,
    pub description: Option<String>,
    pub position: i32,
}

#[derive(Debug, Default)]
pub struct LessonChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub position: Option<i32>,
}

pub struct CourseService {
    pool: PgPool,
}

impl CourseService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_course(&self, new_course: NewCourse) -> Result<Course, ContentError> {
        let sql = format!(
            "INSERT INTO courses (id, instructor_id, title, description, category, is_published) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {COURSE_COLUMNS}"
        );
        let course = sqlx::query_as::<_, Course>(&sql)
            .bind(Uuid::new_v4())
            .bind(new_course.instructor_id)
            .bind(&new_course.title)
            .bind(&new_course.description)
            .bind(&new_course.category)
            .bind(new_course.is_published)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!("created course {} ({})", course.title, course.id);
        Ok(course)
    }

    pub async fn get_course(&self, id: Uuid) -> Result<Course, ContentError> {
        let sql =
            format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1 AND is_active = TRUE");
        sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ContentError::NotFound("Course"))
    }

    pub async fn list_courses(
        &self,
        params: PageParams,
        filter: &CourseFilter,
    ) -> Result<(Vec<Course>, i64), ContentError> {
        let where_clause = "WHERE is_active = TRUE \
             AND ($1::int IS NULL OR instructor_id = $1) \
             AND ($2::text IS NULL OR title ILIKE '%' || $2 || '%' \
                                   OR description ILIKE '%' || $2 || '%') \
             AND ($3::bool IS NULL OR is_published = $3)";

        let sql = format!(
            "SELECT {COURSE_COLUMNS} FROM courses {where_clause} \
             ORDER BY created_at DESC LIMIT $4 OFFSET $5"
        );
        let courses = sqlx::query_as::<_, Course>(&sql)
            .bind(filter.instructor_id)
            .bind(&filter.search)
            .bind(filter.is_published)
            .bind(params.size)
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await?;

        let sql = format!("SELECT COUNT(*) FROM courses {where_clause}");
        let (total,): (i64,) = sqlx::query_as(&sql)
            .bind(filter.instructor_id)
            .bind(&filter.search)
            .bind(filter.is_published)
            .fetch_one(&self.pool)
            .await?;

        Ok((courses, total))
    }

    pub async fn update_course(
        &self,
        id: Uuid,
        changes: CourseChanges,
    ) -> Result<Course, ContentError> {
        let sql = format!(
            "UPDATE courses SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                category = COALESCE($4, category), \
                is_published = COALESCE($5, is_published), \
                updated_at = NOW() \
             WHERE id = $1 AND is_active = TRUE RETURNING {COURSE_COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .bind(&changes.title)
            .bind(&changes.description)
            .bind(&changes.category)
            .bind(changes.is_published)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ContentError::NotFound("Course"))
    }

    /// Soft-delete a course and everything beneath it (lessons, decks,
    /// flashcards) in one transaction.
    pub async fn delete_course(&self, id: Uuid) -> Result<(), ContentError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE courses SET is_active = FALSE, lesson_count = 0, updated_at = NOW() \
             WHERE id = $1 AND is_active = TRUE",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(ContentError::NotFound("Course"));
        }

        sqlx::query(
            "UPDATE flashcards SET is_active = FALSE, updated_at = NOW() \
             WHERE is_active = TRUE AND deck_id IN (\
                 SELECT d.id FROM decks d \
                 JOIN lessons l ON l.id = d.lesson_id WHERE l.course_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE decks SET is_active = FALSE, flashcard_count = 0, updated_at = NOW() \
             WHERE is_active = TRUE \
               AND lesson_id IN (SELECT id FROM lessons WHERE course_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE lessons SET is_active = FALSE, updated_at = NOW() \
             WHERE course_id = $1 AND is_active = TRUE",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!("soft-deleted course {} and its children", id);
        Ok(())
    }

    /// One record for the smoke-test status endpoint, if any exist.
    pub async fn sample_course(&self) -> Result<Option<Course>, ContentError> {
        let sql = format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE is_active = TRUE \
             ORDER BY created_at DESC LIMIT 1"
        );
        Ok(sqlx::query_as::<_, Course>(&sql)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn create_lesson(
        &self,
        course_id: Uuid,
        new_lesson: NewLesson,
    ) -> Result<Lesson, ContentError> {
        let mut tx = self.pool.begin().await?;

        // The lesson must reference an existing, active course
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM courses WHERE id = $1 AND is_active = TRUE")
                .bind(course_id)
                .fetch_one(&mut *tx)
                .await?;
        if count == 0 {
            return Err(ContentError::NotFound("Course"));
        }

        let sql = format!(
            "INSERT INTO lessons (id, course_id, title, description, position) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {LESSON_COLUMNS}"
        );
        let lesson = sqlx::query_as::<_, Lesson>(&sql)
            .bind(Uuid::new_v4())
            .bind(course_id)
            .bind(&new_lesson.title)
            .bind(&new_lesson.description)
            .bind(new_lesson.position)
            .fetch_one(&mut *tx)
            .await?;

        Self::recompute_lesson_count(&mut tx, course_id).await?;
        tx.commit().await?;

        Ok(lesson)
    }

    pub async fn list_lessons(&self, course_id: Uuid) -> Result<Vec<Lesson>, ContentError> {
        // 404 for a missing parent rather than an empty page
        self.get_course(course_id).await?;

        let sql = format!(
            "SELECT {LESSON_COLUMNS} FROM lessons \
             WHERE course_id = $1 AND is_active = TRUE ORDER BY position, created_at"
        );
        Ok(sqlx::query_as::<_, Lesson>(&sql)
            .bind(course_id)
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn get_lesson(&self, id: Uuid) -> Result<Lesson, ContentError> {
        let sql =
            format!("SELECT {LESSON_COLUMNS} FROM lessons WHERE id = $1 AND is_active = TRUE");
        sqlx::query_as::<_, Lesson>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ContentError::NotFound("Lesson"))
    }

    pub async fn update_lesson(
        &self,
        id: Uuid,
        changes: LessonChanges,
    ) -> Result<Lesson, ContentError> {
        let sql = format!(
            "UPDATE lessons SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                position = COALESCE($4, position), \
                updated_at = NOW() \
             WHERE id = $1 AND is_active = TRUE RETURNING {LESSON_COLUMNS}"
        );
        sqlx::query_as::<_, Lesson>(&sql)
            .bind(id)
            .bind(&changes.title)
            .bind(&changes.description)
            .bind(changes.position)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ContentError::NotFound("Lesson"))
    }

    /// Soft-delete a lesson, cascade to its decks and flashcards, and bring
    /// the parent course's lesson count back in line, all in one transaction.
    pub async fn delete_lesson(&self, id: Uuid) -> Result<(), ContentError> {
        let lesson = self.get_lesson(id).await?;
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE flashcards SET is_active = FALSE, updated_at = NOW() \
             WHERE is_active = TRUE \
               AND deck_id IN (SELECT id FROM decks WHERE lesson_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE decks SET is_active = FALSE, flashcard_count = 0, updated_at = NOW() \
             WHERE lesson_id = $1 AND is_active = TRUE",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE lessons SET is_active = FALSE, updated_at = NOW() \
             WHERE id = $1 AND is_active = TRUE",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        Self::recompute_lesson_count(&mut tx, lesson.course_id).await?;
        tx.commit().await?;

        Ok(())
    }

    /// The lesson count is a cache of the active-lesson set, never written
    /// independently of it.
    async fn recompute_lesson_count(
        tx: &mut Transaction<'_, Postgres>,
        course_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE courses SET lesson_count = (\
                 SELECT COUNT(*) FROM lessons WHERE course_id = $1 AND is_active = TRUE), \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(course_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
