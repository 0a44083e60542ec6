use lms_api_rust::config::{listen_port, AppConfig};
use lms_api_rust::gateway;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up service URLs and ports
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    tracing::info!("Starting API gateway in {:?} mode", config.environment);

    let app = gateway::app(config.gateway);

    let port = listen_port("GATEWAY_PORT", 8000);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🌐 LMS API Gateway listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
