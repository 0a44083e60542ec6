mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use lms_api_rust::gateway;

/// Spin up echo upstreams for the assignment and content services plus a
/// gateway routing to them. The auth upstream is left dead on purpose.
async fn setup() -> Result<(common::TestApp, common::TestApp, common::TestApp)> {
    let assignment = common::spawn_app(common::echo_service("assignment-service")).await?;
    let content = common::spawn_app(common::echo_service("content-service")).await?;

    let config = common::gateway_config(
        &assignment.base_url,
        &content.base_url,
        &common::dead_upstream_url()?,
    );
    let gateway = common::spawn_app(gateway::app(config)).await?;

    Ok((gateway, assignment, content))
}

#[tokio::test]
async fn forwards_method_path_and_query() -> Result<()> {
    let (gateway, _assignment, _content) = setup().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!(
            "{}/api/assignments/17?page=2&size=5",
            gateway.base_url
        ))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["method"], "GET");
    assert_eq!(body["path"], "/api/assignments/17");
    assert_eq!(body["query"], "page=2&size=5");
    Ok(())
}

#[tokio::test]
async fn rewrites_content_prefix_and_forwards_body() -> Result<()> {
    let (gateway, _assignment, _content) = setup().await?;
    let client = reqwest::Client::new();

    let payload = json!({"title": "Algebra", "instructor_id": 1});
    let res = client
        .post(format!("{}/api/courses/", gateway.base_url))
        .json(&payload)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["method"], "POST");
    // The /api/courses prefix maps to /api/v1/courses on the upstream
    assert_eq!(body["path"], "/api/v1/courses/");
    assert_eq!(body["body"], payload);
    Ok(())
}

#[tokio::test]
async fn relays_upstream_responses_verbatim() -> Result<()> {
    let (gateway, assignment, _content) = setup().await?;
    let client = reqwest::Client::new();

    for suffix in ["error", "missing"] {
        let direct = client
            .get(format!("{}/api/assignments/{}", assignment.base_url, suffix))
            .send()
            .await?;
        let direct_status = direct.status();
        let direct_body = direct.bytes().await?;

        let relayed = client
            .get(format!("{}/api/assignments/{}", gateway.base_url, suffix))
            .send()
            .await?;
        assert_eq!(relayed.status(), direct_status);
        assert_eq!(relayed.bytes().await?, direct_body);
    }
    Ok(())
}

#[tokio::test]
async fn unknown_prefix_is_not_found() -> Result<()> {
    let (gateway, _assignment, _content) = setup().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/nonexistent/", gateway.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn unsupported_methods_are_rejected() -> Result<()> {
    let (gateway, _assignment, _content) = setup().await?;
    let client = reqwest::Client::new();

    let res = client
        .patch(format!("{}/api/assignments/17", gateway.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);

    // A non-forwarded route with the wrong method is equally rejected
    let res = client
        .patch(format!("{}/health", gateway.base_url))
        .send()
        .await?;
    assert!(
        res.status() == StatusCode::METHOD_NOT_ALLOWED
            || res.status() == StatusCode::NOT_FOUND,
        "unexpected status: {}",
        res.status()
    );
    Ok(())
}

#[tokio::test]
async fn unreachable_upstream_is_service_unavailable() -> Result<()> {
    let (gateway, _assignment, _content) = setup().await?;
    let client = reqwest::Client::new();

    // The auth upstream is a port nobody listens on
    let res = client
        .get(format!("{}/api/users/1", gateway.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
    assert!(
        body["message"]
            .as_str()
            .unwrap_or_default()
            .contains("auth_service"),
        "error should name the failed upstream: {}",
        body
    );
    Ok(())
}

#[tokio::test]
async fn gateway_root_lists_services() -> Result<()> {
    let (gateway, _assignment, _content) = setup().await?;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/", gateway.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["service"], "LMS API Gateway");
    assert!(body["services"].get("assignment_service").is_some());
    Ok(())
}
