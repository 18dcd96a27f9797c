//! Routes guarded by the authentication middleware.

use axum::{middleware, routing::get, Router};

use crate::middleware::require_auth;
use crate::state::AppState;

/// Registers `/` and every other `GET` path behind [`require_auth`].
///
/// `route_layer` keeps unmatched methods answering 405 without a challenge.
pub fn routes(state: &AppState) -> Router<AppState> {
    let guard = middleware::from_fn_with_state(state.clone(), require_auth);

    Router::new()
        .route("/", get(authenticated))
        .route("/*path", get(authenticated))
        .route_layer(guard)
}

async fn authenticated() -> &'static str {
    "Authenticated!"
}
