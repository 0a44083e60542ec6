use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Flashcard deck, attached to a lesson. `flashcard_count` is a denormalized
/// cache, recomputed in the same transaction as any flashcard mutation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Deck {
    pub id: Uuid,
    pub lesson_id: Uuid,
    pub instructor_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub is_published: bool,
    pub is_active: bool,
    pub flashcard_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A flashcard always references an existing deck.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Flashcard {
    pub id: Uuid,
    pub deck_id: Uuid,
    pub front_text: String,
    pub back_text: String,
    pub position: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}
