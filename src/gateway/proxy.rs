use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, Method},
    response::{IntoResponse, Response},
};

use crate::error::ApiError;

use super::GatewayState;

/// Largest request body the gateway will buffer for forwarding.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Fallback handler: match the path prefix, forward the request, and relay
/// the upstream's status and body verbatim.
pub async fn forward(State(state): State<GatewayState>, request: Request) -> Response {
    match forward_inner(state, request).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

async fn forward_inner(state: GatewayState, request: Request) -> Result<Response, ApiError> {
    let method = request.method().clone();
    if !matches!(
        method,
        Method::GET | Method::POST | Method::PUT | Method::DELETE
    ) {
        return Err(ApiError::method_not_allowed(format!(
            "Method {} is not supported by the gateway",
            method
        )));
    }

    let path = request.uri().path().to_string();
    let target = state
        .routes
        .resolve(&path)
        .ok_or_else(|| ApiError::not_found(format!("No route configured for {}", path)))?;

    let mut url = format!("{}{}", target.upstream, target.path);
    if let Some(query) = request.uri().query() {
        url.push('?');
        url.push_str(query);
    }

    let headers = request.headers().clone();
    let body = axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read request body: {}", e)))?;

    let mut upstream_request = state.client.request(method, &url);
    for (name, value) in headers.iter() {
        // Hop-by-hop headers are the proxy's own concern; content-length is
        // recomputed from the forwarded body
        if name == header::HOST
            || name == header::CONTENT_LENGTH
            || name == header::CONNECTION
            || name == header::TRANSFER_ENCODING
        {
            continue;
        }
        upstream_request = upstream_request.header(name, value);
    }
    if !body.is_empty() {
        upstream_request = upstream_request.body(body);
    }

    let upstream_response = upstream_request.send().await.map_err(|e| {
        if e.is_connect() {
            tracing::warn!("upstream {} unreachable: {}", target.service, e);
            ApiError::service_unavailable(format!(
                "Service unavailable: {} at {}",
                target.service, target.upstream
            ))
        } else {
            tracing::error!("forwarding to {} failed: {}", target.service, e);
            ApiError::internal_server_error(format!("Gateway error: {}", e))
        }
    })?;

    // Structural pass-through: same status, same body
    let status = upstream_response.status();
    let content_type = upstream_response.headers().get(header::CONTENT_TYPE).cloned();
    let bytes = upstream_response
        .bytes()
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Gateway error: {}", e)))?;

    let mut response = Response::builder().status(status);
    if let Some(content_type) = content_type {
        response = response.header(header::CONTENT_TYPE, content_type);
    }
    response
        .body(Body::from(bytes))
        .map_err(|e| ApiError::internal_server_error(format!("Gateway error: {}", e)))
}
