use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::models::Flashcard;
use crate::error::ApiError;
use crate::handlers::ServiceState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::deck_service::{DeckService, FlashcardChanges, NewFlashcard};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateFlashcardRequest {
    pub front_text: String,
    pub back_text: String,
    #[serde(default)]
    pub position: i32,
}

/// POST /api/v1/decks/:deck_id/flashcards - create a flashcard; the parent
/// deck must exist and its count is recomputed
pub async fn flashcard_post(
    State(state): State<ServiceState>,
    Path(deck_id): Path<Uuid>,
    Json(payload): Json<CreateFlashcardRequest>,
) -> ApiResult<Flashcard> {
    let mut field_errors = HashMap::new();
    if payload.front_text.trim().is_empty() {
        field_errors.insert("front_text".to_string(), "This field is required".to_string());
    }
    if payload.back_text.trim().is_empty() {
        field_errors.insert("back_text".to_string(), "This field is required".to_string());
    }
    if !field_errors.is_empty() {
        return Err(ApiError::validation_error(
            "Invalid flashcard payload",
            Some(field_errors),
        ));
    }

    let service = DeckService::new(state.pool.clone());
    let card = service
        .create_flashcard(
            deck_id,
            NewFlashcard {
                front_text: payload.front_text,
                back_text: payload.back_text,
                position: payload.position,
            },
        )
        .await?;

    Ok(ApiResponse::created(card))
}

/// GET /api/v1/decks/:deck_id/flashcards - all active flashcards, in order
pub async fn flashcards_get(
    State(state): State<ServiceState>,
    Path(deck_id): Path<Uuid>,
) -> ApiResult<Vec<Flashcard>> {
    let service = DeckService::new(state.pool.clone());
    let cards = service.list_flashcards(deck_id).await?;
    Ok(ApiResponse::success(cards))
}

/// GET /api/v1/flashcards/:id
pub async fn flashcard_get(
    State(state): State<ServiceState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Flashcard> {
    let service = DeckService::new(state.pool.clone());
    let card = service.get_flashcard(id).await?;
    Ok(ApiResponse::success(card))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateFlashcardRequest {
    pub front_text: Option<String>,
    pub back_text: Option<String>,
    pub position: Option<i32>,
}

/// PUT /api/v1/flashcards/:id - partial update
pub async fn flashcard_put(
    State(state): State<ServiceState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateFlashcardRequest>,
) -> ApiResult<Flashcard> {
    let service = DeckService::new(state.pool.clone());
    let card = service
        .update_flashcard(
            id,
            FlashcardChanges {
                front_text: payload.front_text,
                back_text: payload.back_text,
                position: payload.position,
            },
        )
        .await?;
    Ok(ApiResponse::success(card))
}

/// DELETE /api/v1/flashcards/:id - soft delete; the deck count is recomputed
pub async fn flashcard_delete(
    State(state): State<ServiceState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    let service = DeckService::new(state.pool.clone());
    service.delete_flashcard(id).await?;
    Ok(ApiResponse::success(
        json!({ "message": "Flashcard deleted successfully" }),
    ))
}
