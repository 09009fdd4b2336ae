//! Health check route
//!
//! | Path | Method | Meaning |
//! |------|--------|---------|
//! | /health | GET | liveness and store size |
//!
//! ```json
//! { "status": "ok", "version": "0.1.0", "uptime_seconds": 42, "markers": 3 }
//! ```

use std::time::Instant;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_seconds: u64,
    /// Markers currently stored
    markers: usize,
}

// Set on first use, close enough to startup
static START_TIME: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let start = START_TIME.get_or_init(Instant::now);
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: start.elapsed().as_secs(),
        markers: state.markers.marker_count().await,
    })
}
