use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use lms_api_rust::config::{listen_port, AppConfig};
use lms_api_rust::database;
use lms_api_rust::handlers::{self, ServiceState};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let mut config = AppConfig::from_env();
    if let Ok(url) = std::env::var("AUTH_DATABASE_URL") {
        config.database.url = url;
    }
    tracing::info!("Starting auth service in {:?} mode", config.environment);

    let pool = database::connect_pool(&config.database)
        .await
        .unwrap_or_else(|e| panic!("failed to connect to database: {}", e));

    let state = ServiceState::new(pool, config, "auth-service");
    let app = Router::new()
        .route("/", get(handlers::auth::root))
        .route("/health", get(handlers::health))
        .with_state(state.clone())
        .merge(handlers::auth::router(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let port = listen_port("AUTH_SERVICE_PORT", 8001);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🔐 Auth service listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
