use anyhow::{Context, Result};
use axum::{
    extract::Request,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;

use lms_api_rust::config::GatewayConfig;

pub struct TestApp {
    pub port: u16,
    pub base_url: String,
}

/// Serve a router on a free localhost port for the lifetime of the test
/// process.
pub async fn spawn_app(app: Router) -> Result<TestApp> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind test listener")?;

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });

    Ok(TestApp {
        port,
        base_url: format!("http://127.0.0.1:{}", port),
    })
}

/// A free port nobody is listening on, for simulating a dead upstream.
pub fn dead_upstream_url() -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    Ok(format!("http://127.0.0.1:{}", port))
}

/// Fake upstream: healthy /health, an /error suffix that fails with 500, and
/// an echo fallback reporting exactly what the service received.
pub fn echo_service(name: &'static str) -> Router {
    Router::new()
        .route(
            "/health",
            get(move || async move { Json(json!({"status": "healthy", "service": name})) }),
        )
        .fallback(echo)
}

/// Fake upstream whose health endpoint reports failure.
pub fn unhealthy_service() -> Router {
    Router::new().route(
        "/health",
        get(|| async {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": "unhealthy", "database": "disconnected"})),
            )
        }),
    )
}

async fn echo(request: Request) -> impl IntoResponse {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);

    if path.ends_with("/error") {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": "upstream exploded"})),
        )
            .into_response();
    }
    if path.ends_with("/missing") {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "record not found"})),
        )
            .into_response();
    }

    let body = axum::body::to_bytes(request.into_body(), 1024 * 1024)
        .await
        .unwrap_or_default();
    let body_json: Option<serde_json::Value> = serde_json::from_slice(&body).ok();

    Json(json!({
        "method": method,
        "path": path,
        "query": query,
        "body": body_json,
    }))
    .into_response()
}

/// Gateway configuration pointing at the given upstream base URLs, with the
/// short timeouts tests want.
pub fn gateway_config(assignment: &str, content: &str, auth: &str) -> GatewayConfig {
    GatewayConfig {
        assignment_service_url: assignment.to_string(),
        content_service_url: content.to_string(),
        auth_service_url: auth.to_string(),
        forward_timeout_secs: 5,
        health_timeout_secs: 2,
    }
}
