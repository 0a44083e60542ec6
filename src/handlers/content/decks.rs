use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::models::Deck;
use crate::error::ApiError;
use crate::handlers::ServiceState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::pagination::{PageParams, PageQuery, Paginated};
use crate::services::deck_service::{DeckChanges, DeckFilter, DeckService, NewDeck};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateDeckRequest {
    pub lesson_id: Uuid,
    pub instructor_id: i32,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

/// POST /api/v1/decks - create a deck; the parent lesson must exist
pub async fn deck_post(
    State(state): State<ServiceState>,
    Json(payload): Json<CreateDeckRequest>,
) -> ApiResult<Deck> {
    let mut field_errors = HashMap::new();
    if payload.title.trim().is_empty() {
        field_errors.insert("title".to_string(), "This field is required".to_string());
    }
    if payload.instructor_id < 1 {
        field_errors.insert(
            "instructor_id".to_string(),
            "Must be a positive user id".to_string(),
        );
    }
    if !field_errors.is_empty() {
        return Err(ApiError::validation_error(
            "Invalid deck payload",
            Some(field_errors),
        ));
    }

    let service = DeckService::new(state.pool.clone());
    let deck = service
        .create_deck(NewDeck {
            lesson_id: payload.lesson_id,
            instructor_id: payload.instructor_id,
            title: payload.title,
            description: payload.description,
            is_published: payload.is_published,
        })
        .await?;

    Ok(ApiResponse::created(deck))
}

#[derive(Debug, Deserialize)]
pub struct DecksQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub lesson_id: Option<Uuid>,
    pub instructor_id: Option<i32>,
    pub search: Option<String>,
    pub is_published: Option<bool>,
}

/// GET /api/v1/decks - paginated deck listing
pub async fn decks_get(
    State(state): State<ServiceState>,
    Query(query): Query<DecksQuery>,
) -> ApiResult<Paginated<Deck>> {
    let params = PageParams::from_query(
        PageQuery {
            page: query.page,
            size: query.size,
        },
        &state.config.pagination,
    )?;
    let filter = DeckFilter {
        lesson_id: query.lesson_id,
        instructor_id: query.instructor_id,
        search: query.search,
        is_published: query.is_published,
    };

    let service = DeckService::new(state.pool.clone());
    let (decks, total) = service.list_decks(params, &filter).await?;

    Ok(ApiResponse::success(Paginated::new(decks, total, params)))
}

/// GET /api/v1/decks/status - smoke-test status with a sample record
pub async fn status_get(State(state): State<ServiceState>) -> Json<Value> {
    let service = DeckService::new(state.pool.clone());
    match service.sample_deck().await {
        Ok(Some(deck)) => Json(json!({
            "service": "content-service",
            "status": "healthy",
            "sample_deck": {
                "id": deck.id,
                "title": deck.title,
                "flashcard_count": deck.flashcard_count,
                "created_at": deck.created_at,
            },
            "message": "Service is operational"
        })),
        Ok(None) => Json(json!({
            "service": "content-service",
            "status": "healthy",
            "message": "No decks found"
        })),
        Err(e) => {
            tracing::error!("deck status probe failed: {}", e);
            Json(json!({
                "service": "content-service",
                "status": "error"
            }))
        }
    }
}

/// GET /api/v1/decks/:id
pub async fn deck_get(State(state): State<ServiceState>, Path(id): Path<Uuid>) -> ApiResult<Deck> {
    let service = DeckService::new(state.pool.clone());
    let deck = service.get_deck(id).await?;
    Ok(ApiResponse::success(deck))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateDeckRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_published: Option<bool>,
}

/// PUT /api/v1/decks/:id - partial update
pub async fn deck_put(
    State(state): State<ServiceState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDeckRequest>,
) -> ApiResult<Deck> {
    let service = DeckService::new(state.pool.clone());
    let deck = service
        .update_deck(
            id,
            DeckChanges {
                title: payload.title,
                description: payload.description,
                is_published: payload.is_published,
            },
        )
        .await?;
    Ok(ApiResponse::success(deck))
}

/// DELETE /api/v1/decks/:id - soft delete; flashcards cascade
pub async fn deck_delete(
    State(state): State<ServiceState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    let service = DeckService::new(state.pool.clone());
    service.delete_deck(id).await?;
    Ok(ApiResponse::success(
        json!({ "message": "Deck deleted successfully" }),
    ))
}
