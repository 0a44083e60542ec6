// Auth service routes: token acquisition under /api/v1/auth, user
// management under /api/v1/users.

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::handlers::ServiceState;
use crate::middleware::require_auth;

pub mod login;
pub mod refresh;
pub mod register;
pub mod users;
pub mod utils;

pub use login::login_post;
pub use refresh::refresh_post;
pub use register::register_post;

pub fn router(state: ServiceState) -> Router {
    Router::new()
        .route("/api/v1/auth/register", post(register::register_post))
        .route("/api/v1/auth/login", post(login::login_post))
        .route("/api/v1/auth/refresh", post(refresh::refresh_post))
        .route(
            "/api/v1/users/me",
            get(users::me_get).layer(from_fn_with_state(state.clone(), require_auth)),
        )
        .route("/api/v1/users", get(users::users_get))
        .route("/api/v1/users/", get(users::users_get))
        .route(
            "/api/v1/users/:id",
            get(users::user_get)
                .put(users::user_put)
                .delete(users::user_delete),
        )
        .with_state(state)
}

/// GET / - service directory
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "LMS Auth Service",
        "version": env!("CARGO_PKG_VERSION"),
        "health": "/health",
        "endpoints": {
            "register": "/api/v1/auth/register",
            "login": "/api/v1/auth/login",
            "refresh": "/api/v1/auth/refresh",
            "users": "/api/v1/users"
        }
    }))
}
