//! Real-time presence and shared video watchlist server.
//!
//! Clients connect over WebSocket, join under a nickname, and receive the
//! roster of who is online plus every change to the shared record list.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod services;

pub use config::Config;
pub use error::AppError;
pub use handlers::http::AppState;
pub use services::session::SessionCoordinator;

use axum::http::{HeaderValue, Method};
use axum::routing::{delete, get};
use handlers::http;
use tower_http::cors::{Any, CorsLayer};

/// Build the API router (ws, records, health). Used by main and by integration tests.
pub fn create_app(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/ws", get(handlers::ws_handler))
        .route("/records", get(http::list_records).post(http::create_record))
        .route("/records/:id", delete(http::delete_record))
        .route("/health", get(http::health))
        .with_state(state)
}

/// CORS for the browser front-end. `*` allows any origin.
pub fn cors_layer(origin: &str) -> Result<CorsLayer, AppError> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);
    if origin.trim() == "*" {
        return Ok(layer.allow_origin(Any));
    }
    let origin = HeaderValue::from_str(origin.trim())
        .map_err(|_| AppError::Config(format!("Invalid CORS_ORIGIN: {}", origin)))?;
    Ok(layer.allow_origin(origin))
}
