//! Application startup and server initialization.
//!
//! Builds the verifier, nonce store and metrics from configuration, then
//! serves the router.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::auth::Verifier;
use crate::config::{ConfigError, ConfigV1};
use crate::metrics::Metrics;
use crate::routes;
use crate::state::AppState;
use crate::store::create_store;
use crate::utils::log_throttle::LogThrottle;

/// Build the shared state from a validated configuration.
///
/// Must be called inside a tokio runtime when the nonce store is enabled,
/// so its cleanup task can be spawned.
pub fn build_state(config: ConfigV1) -> Result<AppState, ConfigError> {
    let config = Arc::new(config);
    let store = create_store(&config.auth.nonce_store)?;
    let verifier = Verifier::from_config(&config.auth, store)?.map(Arc::new);
    let metrics = Metrics::new()?;

    Ok(AppState {
        config,
        verifier,
        metrics,
        log_throttle: Arc::new(LogThrottle::default()),
    })
}

/// Initializes and runs the application server.
///
/// # Errors
///
/// Returns an error if the configuration is rejected, the server fails to
/// bind to the configured address, or serving fails.
pub async fn run(config: ConfigV1) -> Result<(), Box<dyn std::error::Error>> {
    let bind_address = config.bind_address.clone();
    let state = build_state(config)?;
    let app = routes::create_router(state);

    let listener = TcpListener::bind(&bind_address).await?;
    info!("Starting server on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
