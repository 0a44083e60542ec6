// Gateway: a stateless reverse-proxy that forwards requests to the backend
// services by path prefix and aggregates their health.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::GatewayConfig;

pub mod health;
pub mod proxy;
pub mod routes;

use routes::RouteTable;

#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<GatewayConfig>,
    pub routes: Arc<RouteTable>,
    /// Client for forwarded calls, capped at the per-call timeout budget
    pub client: reqwest::Client,
    /// Short-timeout client for health probes
    pub health_client: reqwest::Client,
}

impl GatewayState {
    pub fn new(config: GatewayConfig) -> Self {
        // Catch malformed upstream URLs at startup, not on the first request
        for upstream in [
            &config.assignment_service_url,
            &config.content_service_url,
            &config.auth_service_url,
        ] {
            url::Url::parse(upstream)
                .unwrap_or_else(|e| panic!("invalid upstream URL {}: {}", upstream, e));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.forward_timeout_secs))
            .build()
            .expect("failed to build gateway HTTP client");
        let health_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.health_timeout_secs))
            .build()
            .expect("failed to build gateway health client");

        Self {
            routes: Arc::new(RouteTable::from_config(&config)),
            config: Arc::new(config),
            client,
            health_client,
        }
    }
}

pub fn app(config: GatewayConfig) -> Router {
    let state = GatewayState::new(config);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health::health))
        // Everything else goes through prefix matching and forwarding
        .fallback(proxy::forward)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET / - gateway directory
async fn root(State(state): State<GatewayState>) -> Json<Value> {
    Json(json!({
        "service": "LMS API Gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "health": "/health",
        "services": {
            "assignment_service": state.config.assignment_service_url,
            "content_service": state.config.content_service_url,
            "auth_service": state.config.auth_service_url,
        },
        "available_endpoints": {
            "assignments": "/api/assignments/",
            "progress": "/api/progress/",
            "sessions": "/api/sessions/",
            "analytics": "/api/analytics/",
            "courses": "/api/courses/",
            "decks": "/api/decks/",
            "auth": "/api/auth/",
            "users": "/api/users/",
        }
    }))
}
