//! Health check endpoint.

use crate::state::AppState;
use axum::{routing::get, Router};

/// Registers health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Unauthenticated liveness probe.
async fn health_check() -> &'static str {
    "OK"
}
