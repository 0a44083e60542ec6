mod common;

use anyhow::Result;
use reqwest::StatusCode;

use lms_api_rust::gateway;

#[tokio::test]
async fn classifies_each_upstream_independently() -> Result<()> {
    let healthy = common::spawn_app(common::echo_service("assignment-service")).await?;
    let unhealthy = common::spawn_app(common::unhealthy_service()).await?;
    let dead = common::dead_upstream_url()?;

    let config = common::gateway_config(&healthy.base_url, &unhealthy.base_url, &dead);
    let gateway = common::spawn_app(gateway::app(config)).await?;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/health", gateway.base_url))
        .send()
        .await?;

    // The gateway's own health never depends on its upstreams
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["gateway"], "healthy");
    assert_eq!(body["services"]["assignment_service"], "healthy");
    assert_eq!(body["services"]["content_service"], "unhealthy");
    assert_eq!(body["services"]["auth_service"], "unavailable");
    Ok(())
}

#[tokio::test]
async fn all_upstreams_healthy() -> Result<()> {
    let a = common::spawn_app(common::echo_service("assignment-service")).await?;
    let b = common::spawn_app(common::echo_service("content-service")).await?;
    let c = common::spawn_app(common::echo_service("auth-service")).await?;

    let config = common::gateway_config(&a.base_url, &b.base_url, &c.base_url);
    let gateway = common::spawn_app(gateway::app(config)).await?;

    let client = reqwest::Client::new();
    let body = client
        .get(format!("{}/health", gateway.base_url))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;

    for service in ["assignment_service", "content_service", "auth_service"] {
        assert_eq!(body["services"][service], "healthy", "{} not healthy", service);
    }
    Ok(())
}
