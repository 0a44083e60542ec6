use axum::{extract::State, Json};
use futures::future::join_all;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::{json, Map, Value};

use super::routes::RouteTable;
use super::GatewayState;

/// Classification of one upstream from the gateway's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpstreamHealth {
    Healthy,
    Unhealthy,
    Unavailable,
}

pub fn classify(status: Result<StatusCode, ()>) -> UpstreamHealth {
    match status {
        Ok(status) if status.is_success() => UpstreamHealth::Healthy,
        Ok(_) => UpstreamHealth::Unhealthy,
        Err(()) => UpstreamHealth::Unavailable,
    }
}

async fn probe(client: &reqwest::Client, base_url: &str) -> UpstreamHealth {
    let result = client
        .get(format!("{}/health", base_url))
        .send()
        .await
        .map(|resp| resp.status())
        .map_err(|_| ());
    classify(result)
}

/// GET /health - aggregate health. The gateway itself is always healthy
/// here; each upstream is probed concurrently with a short timeout and
/// classified independently.
pub async fn health(State(state): State<GatewayState>) -> Json<Value> {
    let upstreams = RouteTable::upstreams(&state.config);

    let probes = join_all(
        upstreams
            .iter()
            .map(|(_, base_url)| probe(&state.health_client, base_url)),
    )
    .await;

    let mut services = Map::new();
    for ((name, _), status) in upstreams.iter().zip(probes) {
        services.insert(
            name.to_string(),
            serde_json::to_value(status).unwrap_or(Value::Null),
        );
    }

    Json(json!({
        "gateway": "healthy",
        "services": services
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_xx_is_healthy() {
        assert_eq!(classify(Ok(StatusCode::OK)), UpstreamHealth::Healthy);
        assert_eq!(classify(Ok(StatusCode::NO_CONTENT)), UpstreamHealth::Healthy);
    }

    #[test]
    fn other_statuses_are_unhealthy() {
        assert_eq!(
            classify(Ok(StatusCode::INTERNAL_SERVER_ERROR)),
            UpstreamHealth::Unhealthy
        );
        assert_eq!(
            classify(Ok(StatusCode::SERVICE_UNAVAILABLE)),
            UpstreamHealth::Unhealthy
        );
        assert_eq!(classify(Ok(StatusCode::NOT_FOUND)), UpstreamHealth::Unhealthy);
    }

    #[test]
    fn probe_failure_is_unavailable() {
        assert_eq!(classify(Err(())), UpstreamHealth::Unavailable);
    }
}
