//! API routes
//!
//! - [`markers`] - marker listing, search and creation
//! - [`health`] - liveness probe

pub mod health;
pub mod markers;

use axum::Router;
use axum::http::Uri;

use crate::core::ServerState;
use crate::utils::AppError;

/// Every route under `prefix` (no middleware, no state)
pub fn build_router(prefix: &str) -> Router<ServerState> {
    let routes = Router::new()
        .merge(markers::router())
        .merge(health::router());

    let router = if prefix.is_empty() {
        routes
    } else {
        Router::new().nest(prefix, routes)
    };
    router.fallback(not_found)
}

async fn not_found(uri: Uri) -> AppError {
    AppError::not_found(format!("No route for {}", uri.path()))
}
