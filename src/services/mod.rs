pub mod analytics_service;
pub mod assignment_service;
pub mod course_service;
pub mod deck_service;
pub mod session_service;
pub mod user_service;

/// Shared error type for the content hierarchy (courses, lessons, decks,
/// flashcards).
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}
