//! HTTP route definitions and handlers.
//!
//! Protected routes sit behind the authentication middleware; health and
//! metrics stay open.

mod health_routes;
mod metrics_routes;
mod protected_routes;

use crate::state::AppState;
use axum::Router;

/// Creates the application router with all configured routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(protected_routes::routes(&state))
        .merge(health_routes::routes())
        .merge(metrics_routes::routes())
        .with_state(state)
}
