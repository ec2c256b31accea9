use std::sync::Arc;

use praxis_api::cache::MemoryCache;
use praxis_api::state::AppState;
use praxis_api::store::PgStore;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = praxis_api::config::config();

    tracing_subscriber::fmt::init();
    tracing::info!("starting Praxis API in {:?} mode", config.environment);

    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set (directly or via .env)");

    let store = PgStore::connect(&database_url)
        .await
        .unwrap_or_else(|e| panic!("failed to connect to database: {}", e));

    let state = AppState::new(Arc::new(store), Arc::new(MemoryCache::new()));
    let app = praxis_api::app(state);

    // Allow deployments to override the port via env
    let port = std::env::var("PRAXIS_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 Praxis API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
