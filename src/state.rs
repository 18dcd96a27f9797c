//! Shared application state.

use crate::auth::Verifier;
use crate::config::ConfigV1;
use crate::metrics::Metrics;
use crate::utils::log_throttle::LogThrottle;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; everything inside is reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// `None` when the configured scheme is `none`.
    pub verifier: Option<Arc<Verifier>>,
    pub metrics: Metrics,
    pub log_throttle: Arc<LogThrottle>,
}
