use super::header::HeaderError;

/// Why a request did not authenticate.
///
/// Only logs ever see these details. On the wire every variant but
/// `MissingCredentials` is the same plain 401.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("no credentials supplied")]
    MissingCredentials,
    #[error("malformed authorization header: {0}")]
    MalformedHeader(HeaderError),
    #[error("authorization scheme is not the configured one")]
    UnsupportedScheme,
    #[error("credentials do not match")]
    CredentialMismatch,
    #[error("digest computation failed: unsupported algorithm")]
    UnsupportedAlgorithm,
    #[error("digest parameter '{0}' does not match the challenge or request")]
    ParameterMismatch(&'static str),
    #[error("nonce was not issued by this server")]
    ForgedNonce,
    #[error("nonce is stale")]
    StaleNonce,
    #[error("nonce-count was already used")]
    ReplayedNonce,
}

impl AuthError {
    /// Stale nonces get a challenge with `stale=true` so the client retries
    /// without prompting the user again.
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleNonce)
    }

    /// Short, fixed label used for log throttling and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "missing_credentials",
            Self::MalformedHeader(_) => "malformed_header",
            Self::UnsupportedScheme => "unsupported_scheme",
            Self::CredentialMismatch => "credential_mismatch",
            Self::UnsupportedAlgorithm => "unsupported_algorithm",
            Self::ParameterMismatch(_) => "parameter_mismatch",
            Self::ForgedNonce => "forged_nonce",
            Self::StaleNonce => "stale_nonce",
            Self::ReplayedNonce => "replayed_nonce",
        }
    }
}

impl From<HeaderError> for AuthError {
    fn from(err: HeaderError) -> Self {
        match err {
            HeaderError::UnsupportedScheme => Self::UnsupportedScheme,
            other => Self::MalformedHeader(other),
        }
    }
}
