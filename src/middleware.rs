//! Authentication guard for protected routes.

use std::time::Instant;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, warn};

use crate::auth::{AuthError, AuthResult};
use crate::metrics::MetricsRecorder;
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;

/// Runs the configured verifier before the protected handler.
///
/// Failures short-circuit with `401` and a fresh `WWW-Authenticate`
/// challenge. Without a verifier (scheme `none`) every request passes.
pub async fn require_auth(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, HTTPError> {
    let Some(verifier) = state.verifier.clone() else {
        return Ok(next.run(req).await);
    };
    let scheme = verifier.scheme_name();

    let start = Instant::now();
    let outcome = verifier.authenticate(&req);
    let result = AuthResult::from_outcome(&outcome);

    state.metrics.record_auth_attempt(result.as_str(), scheme);
    state
        .metrics
        .record_auth_duration(start.elapsed().as_secs_f64(), result.as_str(), scheme);

    match outcome {
        Ok(()) => {
            debug!(
                auth_scheme = scheme,
                realm = verifier.realm(),
                http_method = %req.method(),
                url_path = req.uri().path(),
                "Request authenticated"
            );
            Ok(next.run(req).await)
        }
        Err(AuthError::MissingCredentials) => {
            debug!(auth_scheme = scheme, "No credentials supplied; sending challenge");
            Err(HTTPError::unauthorized(verifier.build_challenge()))
        }
        Err(err) => {
            if let Some(suppressed) = state.log_throttle.should_emit(err.reason()) {
                warn!(
                    auth_scheme = scheme,
                    auth_reason = err.reason(),
                    suppressed,
                    "Rejected credentials"
                );
            }
            debug!(auth_scheme = scheme, error = %err, "Authentication failed");
            Err(HTTPError::unauthorized(verifier.challenge(err.is_stale())))
        }
    }
}
