// Content service routes: the course -> lesson -> deck -> flashcard
// hierarchy under /api/v1.

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::handlers::ServiceState;

pub mod courses;
pub mod decks;
pub mod flashcards;
pub mod lessons;

pub fn router(state: ServiceState) -> Router {
    Router::new()
        // Courses
        .route(
            "/api/v1/courses",
            get(courses::courses_get).post(courses::course_post),
        )
        .route(
            "/api/v1/courses/",
            get(courses::courses_get).post(courses::course_post),
        )
        .route("/api/v1/courses/status", get(courses::status_get))
        .route(
            "/api/v1/courses/:course_id",
            get(courses::course_get)
                .put(courses::course_put)
                .delete(courses::course_delete),
        )
        // Lessons nest under their course
        .route(
            "/api/v1/courses/:course_id/lessons",
            get(lessons::lessons_get).post(lessons::lesson_post),
        )
        .route(
            "/api/v1/lessons/:id",
            get(lessons::lesson_get)
                .put(lessons::lesson_put)
                .delete(lessons::lesson_delete),
        )
        // Decks
        .route(
            "/api/v1/decks",
            get(decks::decks_get).post(decks::deck_post),
        )
        .route(
            "/api/v1/decks/",
            get(decks::decks_get).post(decks::deck_post),
        )
        .route("/api/v1/decks/status", get(decks::status_get))
        .route(
            "/api/v1/decks/:deck_id",
            get(decks::deck_get)
                .put(decks::deck_put)
                .delete(decks::deck_delete),
        )
        // Flashcards nest under their deck
        .route(
            "/api/v1/decks/:deck_id/flashcards",
            get(flashcards::flashcards_get).post(flashcards::flashcard_post),
        )
        .route(
            "/api/v1/flashcards/:id",
            get(flashcards::flashcard_get)
                .put(flashcards::flashcard_put)
                .delete(flashcards::flashcard_delete),
        )
        .with_state(state)
}

/// GET / - service directory
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "LMS Content Service",
        "version": env!("CARGO_PKG_VERSION"),
        "health": "/health",
        "endpoints": {
            "courses": "/api/v1/courses",
            "lessons": "/api/v1/courses/{course_id}/lessons",
            "decks": "/api/v1/decks",
            "flashcards": "/api/v1/decks/{deck_id}/flashcards"
        }
    }))
}
