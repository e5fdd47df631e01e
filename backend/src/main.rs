use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::{Any, CorsLayer};
use tracing::{info, Level};

mod domain;
mod error;
mod llm;
mod rest;
mod store;

use domain::chatbot::ChatSessionStore;
use llm::ModelClient;
use rest::AppState;
use store::MockDataStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("Seeding in-memory mock data");
    let store = Arc::new(MockDataStore::seed());

    let model = ModelClient::from_env();
    if model.is_configured() {
        info!("Assistant model client configured from environment");
    } else {
        info!("Assistant model client not configured, using rule-based fallback");
    }

    let state = AppState::new(store, Arc::new(ChatSessionStore::new()), Arc::new(model));

    // CORS is wide open; the dashboard frontend is served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = rest::api_router(state).layer(cors);

    let addr = SocketAddr::from(([127, 0, 0, 1], 8000));
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
