//! # Roomcast Gateway Crate
//!
//! Transport adapter for the relay core: an axum WebSocket endpoint that
//! feeds inbound frames to the dispatcher and a per-connection channel map
//! implementing the relay's [`Transport`](roomcast_relay::Transport) seam.
//!
//! ## Architecture
//!
//! - **Transport**: `ConnectionMap`, per-connection outbound channels
//! - **WebSocket**: upgrade handler, read loop, write pump
//! - **State**: dispatcher wiring shared across connections

pub mod state;
pub mod transport;
pub mod websocket;

// Re-export main types for convenience
pub use state::GatewayState;
pub use transport::ConnectionMap;

use axum::{routing::get, Json, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Create the gateway router: the WebSocket upgrade endpoint plus a health
/// probe. Origin policy is permissive; the relay does not authenticate.
pub fn create_router(state: Arc<GatewayState>, ws_path: &str) -> Router {
    Router::new()
        .route(ws_path, get(websocket::chat_websocket_handler))
        .route("/health", get(health))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
