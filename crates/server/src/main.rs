use std::net::SocketAddr;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

mod ai;
mod routes;

const DEFAULT_ADDR: &str = "0.0.0.0:3001";

#[derive(Clone)]
pub struct AppState {
    pub ai_api_key: Option<String>,
    pub ai_model: String,
    pub http: reqwest::Client,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "server=info".into()),
        )
        .init();

    let state = AppState {
        ai_api_key: std::env::var("ANTHROPIC_API_KEY").ok(),
        ai_model: std::env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| ai::DEFAULT_MODEL.to_string()),
        http: reqwest::Client::new(),
    };
    if state.ai_api_key.is_none() {
        tracing::warn!("ANTHROPIC_API_KEY not set, /api/generate will answer 503");
    }

    let app = Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/generate", post(routes::generate))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = std::env::var("SERVER_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let addr: SocketAddr = match addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!("Invalid SERVER_ADDR '{addr}': {e}");
            return;
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {addr}: {e}");
            return;
        }
    };
    tracing::info!("Server running on http://{addr}");
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {e}");
    }
}
