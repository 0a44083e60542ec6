use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::models::{Deck, Flashcard};
use crate::pagination::PageParams;
use crate::services::ContentError;

const DECK_COLUMNS: &str = "id, lesson_id, instructor_id, title, description, is_published, \
                            is_active, flashcard_count, created_at, updated_at";
const FLASHCARD_COLUMNS: &str =
    "id, deck_id, front_text, back_text, position, is_active, created_at, updated_at";

#[derive(Debug)]
pub struct NewDeck {
    pub lesson_id: Uuid,
    pub instructor_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub is_published: bool,
}

#[derive(Debug, Default)]
pub struct DeckChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Default)]
pub struct DeckFilter {
    pub lesson_id: Option<Uuid>,
    pub instructor_id: Option<i32>,
    pub search: Option<String>,
    pub is_published: Option<bool>,
}

#[derive(Debug)]
pub struct NewFlashcard {
    pub front_text: String,
    pub back_text: String,
    pub position: i32,
}

#[derive(Debug, Default)]
pub struct FlashcardChanges {
    pub front_text: Option<String>,
    pub back_text: Option<String>,
    pub position: Option<i32>,
}

pub struct DeckService {
    pool: PgPool,
}

impl DeckService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_deck(&self, new_deck: NewDeck) -> Result<Deck, ContentError> {
        // The deck must reference an existing, active lesson
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM lessons WHERE id = $1 AND is_active = TRUE")
                .bind(new_deck.lesson_id)
                .fetch_one(&self.pool)
                .await?;
        if count == 0 {
            return Err(ContentError::NotFound("Lesson"));
        }

        let sql = format!(
            "INSERT INTO decks (id, lesson_id, instructor_id, title, description, is_published) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {DECK_COLUMNS}"
        );
        let deck = sqlx::query_as::<_, Deck>(&sql)
            .bind(Uuid::new_v4())
            .bind(new_deck.lesson_id)
            .bind(new_deck.instructor_id)
            .bind(&new_deck.title)
            .bind(&new_deck.description)
            .bind(new_deck.is_published)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!("created deck {} ({})", deck.title, deck.id);
        Ok(deck)
    }

    pub async fn get_deck(&self, id: Uuid) -> Result<Deck, ContentError> {
        let sql = format!("SELECT {DECK_COLUMNS} FROM decks WHERE id = $1 AND is_active = TRUE");
        sqlx::query_as::<_, Deck>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ContentError::NotFound("Deck"))
    }

    pub async fn list_decks(
        &self,
        params: PageParams,
        filter: &DeckFilter,
    ) -> Result<(Vec<Deck>, i64), ContentError> {
        let where_clause = "WHERE is_active = TRUE \
             AND ($1::uuid IS NULL OR lesson_id = $1) \
             AND ($2::int IS NULL OR instructor_id = $2) \
             AND ($3::text IS NULL OR title ILIKE '%' || $3 || '%' \
                                   OR description ILIKE '%' || $3 || '%') \
             AND ($4::bool IS NULL OR is_published = $4)";

        let sql = format!(
            "SELECT {DECK_COLUMNS} FROM decks {where_clause} \
             ORDER BY created_at DESC LIMIT $5 OFFSET $6"
        );
        let decks = sqlx::query_as::<_, Deck>(&sql)
            .bind(filter.lesson_id)
            .bind(filter.instructor_id)
            .bind(&filter.search)
            .bind(filter.is_published)
            .bind(params.size)
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await?;

        let sql = format!("SELECT COUNT(*) FROM decks {where_clause}");
        let (total,): (i64,) = sqlx::query_as(&sql)
            .bind(filter.lesson_id)
            .bind(filter.instructor_id)
            .bind(&filter.search)
            .bind(filter.is_published)
            .fetch_one(&self.pool)
            .await?;

        Ok((decks, total))
    }

    pub async fn update_deck(&self, id: Uuid, changes: DeckChanges) -> Result<Deck, ContentError> {
        let sql = format!(
            "UPDATE decks SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                is_published = COALESCE($4, is_published), \
                updated_at = NOW() \
             WHERE id = $1 AND is_active = TRUE RETURNING {DECK_COLUMNS}"
        );
        sqlx::query_as::<_, Deck>(&sql)
            .bind(id)
            .bind(&changes.title)
            .bind(&changes.description)
            .bind(changes.is_published)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ContentError::NotFound("Deck"))
    }

    /// Soft-delete a deck and cascade-deactivate its flashcards in one
    /// transaction.
    pub async fn delete_deck(&self, id: Uuid) -> Result<(), ContentError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE decks SET is_active = FALSE, flashcard_count = 0, updated_at = NOW() \
             WHERE id = $1 AND is_active = TRUE",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(ContentError::NotFound("Deck"));
        }

        sqlx::query(
            "UPDATE flashcards SET is_active = FALSE, updated_at = NOW() \
             WHERE deck_id = $1 AND is_active = TRUE",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!("soft-deleted deck {} and its flashcards", id);
        Ok(())
    }

    pub async fn sample_deck(&self) -> Result<Option<Deck>, ContentError> {
        let sql = format!(
            "SELECT {DECK_COLUMNS} FROM decks WHERE is_active = TRUE \
             ORDER BY created_at DESC LIMIT 1"
        );
        Ok(sqlx::query_as::<_, Deck>(&sql)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn create_flashcard(
        &self,
        deck_id: Uuid,
        new_card: NewFlashcard,
    ) -> Result<Flashcard, ContentError> {
        let mut tx = self.pool.begin().await?;

        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM decks WHERE id = $1 AND is_active = TRUE")
                .bind(deck_id)
                .fetch_one(&mut *tx)
                .await?;
        if count == 0 {
            return Err(ContentError::NotFound("Deck"));
        }

        let sql = format!(
            "INSERT INTO flashcards (id, deck_id, front_text, back_text, position) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {FLASHCARD_COLUMNS}"
        );
        let card = sqlx::query_as::<_, Flashcard>(&sql)
            .bind(Uuid::new_v4())
            .bind(deck_id)
            .bind(&new_card.front_text)
            .bind(&new_card.back_text)
            .bind(new_card.position)
            .fetch_one(&mut *tx)
            .await?;

        Self::recompute_flashcard_count(&mut tx, deck_id).await?;
        tx.commit().await?;

        Ok(card)
    }

    pub async fn list_flashcards(&self, deck_id: Uuid) -> Result<Vec<Flashcard>, ContentError> {
        // 404 for a missing parent rather than an empty page
        self.get_deck(deck_id).await?;

        let sql = format!(
            "SELECT {FLASHCARD_COLUMNS} FROM flashcards \
             WHERE deck_id = $1 AND is_active = TRUE ORDER BY position, created_at"
        );
        Ok(sqlx::query_as::<_, Flashcard>(&sql)
            .bind(deck_id)
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn get_flashcard(&self, id: Uuid) -> Result<Flashcard, ContentError> {
        let sql = format!(
            "SELECT {FLASHCARD_COLUMNS} FROM flashcards WHERE id = $1 AND is_active = TRUE"
        );
        sqlx::query_as::<_, Flashcard>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ContentError::NotFound("Flashcard"))
    }

    pub async fn update_flashcard(
        &self,
        id: Uuid,
        changes: FlashcardChanges,
    ) -> Result<Flashcard, ContentError> {
        let sql = format!(
            "UPDATE flashcards SET \
                front_text = COALESCE($2, front_text), \
                back_text = COALESCE($3, back_text), \
                position = COALESCE($4, position), \
                updated_at = NOW() \
             WHERE id = $1 AND is_active = TRUE RETURNING {FLASHCARD_COLUMNS}"
        );
        sqlx::query_as::<_, Flashcard>(&sql)
            .bind(id)
            .bind(&changes.front_text)
            .bind(&changes.back_text)
            .bind(changes.position)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ContentError::NotFound("Flashcard"))
    }

    pub async fn delete_flashcard(&self, id: Uuid) -> Result<(), ContentError> {
        let card = self.get_flashcard(id).await?;
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE flashcards SET is_active = FALSE, updated_at = NOW() \
             WHERE id = $1 AND is_active = TRUE",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        Self::recompute_flashcard_count(&mut tx, card.deck_id).await?;
        tx.commit().await?;

        Ok(())
    }

    /// The flashcard count is a cache of the active-flashcard set, never
    /// written independently of it.
    async fn recompute_flashcard_count(
        tx: &mut Transaction<'_, Postgres>,
        deck_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE decks SET flashcard_count = (\
                 SELECT COUNT(*) FROM flashcards WHERE deck_id = $1 AND is_active = TRUE), \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(deck_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
