use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use sqlx::PgPool;

use crate::config::AppConfig;

pub mod assignment;
pub mod auth;
pub mod content;

/// Shared per-service state: the service's connection pool plus the
/// configuration injected at startup.
#[derive(Clone)]
pub struct ServiceState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub service_name: &'static str,
}

impl ServiceState {
    pub fn new(pool: PgPool, config: AppConfig, service_name: &'static str) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            service_name,
        }
    }
}

/// GET /health - service liveness plus a database ping. Reports 503 when the
/// database is unreachable so the gateway's aggregate check can tell a
/// degraded service from a dead one.
pub async fn health(State(state): State<ServiceState>) -> impl IntoResponse {
    match crate::database::health_check(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "service": state.service_name,
                "version": env!("CARGO_PKG_VERSION"),
                "database": "connected"
            })),
        ),
        Err(e) => {
            tracing::warn!("{} health check failed: {}", state.service_name, e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "service": state.service_name,
                    "version": env!("CARGO_PKG_VERSION"),
                    "database": "disconnected"
                })),
            )
        }
    }
}
