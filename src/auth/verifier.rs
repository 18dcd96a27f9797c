use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::basic::{basic_challenge, check_basic};
use super::credentials::Credentials;
use super::digest::DigestScheme;
use super::error::AuthError;
use super::header::AuthorizationHeader;
use super::nonce::NonceIssuer;
use crate::config::{AuthConfig, AuthScheme, ConfigError};
use crate::store::NonceStore;

/// What the caller should do with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthResult {
    /// Let the protected handler run.
    Authenticated,
    /// First contact: answer 401 with a challenge.
    NoCredentialsSupplied,
    /// Answer 401 with a challenge; the supplied credentials were rejected.
    InvalidCredentials,
}

impl AuthResult {
    pub fn from_outcome(outcome: &Result<(), AuthError>) -> Self {
        match outcome {
            Ok(()) => Self::Authenticated,
            Err(AuthError::MissingCredentials) => Self::NoCredentialsSupplied,
            Err(_) => Self::InvalidCredentials,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authenticated => "authenticated",
            Self::NoCredentialsSupplied => "no_credentials",
            Self::InvalidCredentials => "invalid_credentials",
        }
    }
}

/// The parts of an HTTP request the verifier looks at.
pub trait AuthRequest {
    /// Raw `Authorization` header value, if any.
    fn authorization(&self) -> Option<&[u8]>;
    fn method(&self) -> &str;
    /// Request target as sent on the request line (path and query).
    fn uri(&self) -> &str;
}

fn request_target(uri: &http::Uri) -> &str {
    uri.path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path())
}

impl AuthRequest for http::request::Parts {
    fn authorization(&self) -> Option<&[u8]> {
        self.headers
            .get(http::header::AUTHORIZATION)
            .map(|value| value.as_bytes())
    }

    fn method(&self) -> &str {
        self.method.as_str()
    }

    fn uri(&self) -> &str {
        request_target(&self.uri)
    }
}

impl<B> AuthRequest for http::Request<B> {
    fn authorization(&self) -> Option<&[u8]> {
        self.headers()
            .get(http::header::AUTHORIZATION)
            .map(|value| value.as_bytes())
    }

    fn method(&self) -> &str {
        self.method().as_str()
    }

    fn uri(&self) -> &str {
        request_target(self.uri())
    }
}

/// A transport-independent request description.
#[derive(Debug, Clone, Default)]
pub struct RequestInfo {
    pub method: String,
    pub uri: String,
    pub authorization: Option<Vec<u8>>,
}

impl RequestInfo {
    pub fn new(method: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            uri: uri.into(),
            authorization: None,
        }
    }

    pub fn with_authorization(mut self, value: impl Into<Vec<u8>>) -> Self {
        self.authorization = Some(value.into());
        self
    }
}

impl AuthRequest for RequestInfo {
    fn authorization(&self) -> Option<&[u8]> {
        self.authorization.as_deref()
    }

    fn method(&self) -> &str {
        &self.method
    }

    fn uri(&self) -> &str {
        &self.uri
    }
}

pub enum Scheme {
    Basic,
    Digest(DigestScheme),
}

/// Decides whether a request carries the expected credentials and builds the
/// challenge to send when it does not.
///
/// Safe to share across request tasks; the only mutable state is inside the
/// nonce store, which synchronizes itself.
pub struct Verifier {
    credentials: Credentials,
    realm: String,
    scheme: Scheme,
}

impl Verifier {
    pub fn basic(credentials: Credentials, realm: impl Into<String>) -> Self {
        Self {
            credentials,
            realm: realm.into(),
            scheme: Scheme::Basic,
        }
    }

    pub fn digest(credentials: Credentials, realm: impl Into<String>, digest: DigestScheme) -> Self {
        Self {
            credentials,
            realm: realm.into(),
            scheme: Scheme::Digest(digest),
        }
    }

    /// Build a verifier from configuration. Returns `None` for the `none`
    /// scheme, where routes are served without authentication.
    pub fn from_config(
        config: &AuthConfig,
        store: Arc<dyn NonceStore>,
    ) -> Result<Option<Self>, ConfigError> {
        if config.scheme == AuthScheme::None {
            warn!("Authentication scheme is 'none'; protected routes are open to everyone.");
            return Ok(None);
        }

        if config.realm.is_empty() || config.realm.chars().any(char::is_control) {
            return Err(ConfigError::InvalidRealm);
        }
        let credentials = Credentials::new(config.username.as_str(), config.password.as_str())?;

        let verifier = match config.scheme {
            AuthScheme::Basic => Self::basic(credentials, config.realm.as_str()),
            AuthScheme::Digest => {
                let issuer = NonceIssuer::new(Duration::from_secs(config.digest.nonce_ttl_secs));
                if !store.is_enabled() {
                    warn!("Digest nonce store disabled; replay of a fresh nonce is not detected.");
                }
                Self::digest(
                    credentials,
                    config.realm.as_str(),
                    DigestScheme::new(config.digest.algorithm, issuer, store),
                )
            }
            AuthScheme::None => return Ok(None),
        };

        info!(
            "Verifier ready: scheme={}, realm='{}'",
            verifier.scheme_name(),
            verifier.realm()
        );
        Ok(Some(verifier))
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    pub fn scheme_name(&self) -> &'static str {
        match &self.scheme {
            Scheme::Basic => "basic",
            Scheme::Digest(_) => "digest",
        }
    }

    /// Classify a request.
    pub fn verify<R: AuthRequest + ?Sized>(&self, request: &R) -> AuthResult {
        AuthResult::from_outcome(&self.authenticate(request))
    }

    /// Like [`Verifier::verify`], keeping the reason for a rejection.
    pub fn authenticate<R: AuthRequest + ?Sized>(&self, request: &R) -> Result<(), AuthError> {
        let raw = request
            .authorization()
            .ok_or(AuthError::MissingCredentials)?;
        let header = AuthorizationHeader::parse(raw)?;

        match (&self.scheme, header) {
            (Scheme::Basic, AuthorizationHeader::Basic(supplied)) => {
                check_basic(&self.credentials, &supplied)
            }
            (Scheme::Digest(digest), AuthorizationHeader::Digest(response)) => digest.check(
                &self.credentials,
                &self.realm,
                request.method(),
                request.uri(),
                &response,
            ),
            (_, supplied) => {
                debug!(
                    supplied_scheme = supplied.scheme(),
                    expected_scheme = self.scheme_name(),
                    "Authorization scheme does not match"
                );
                Err(AuthError::UnsupportedScheme)
            }
        }
    }

    /// A fresh `WWW-Authenticate` value.
    pub fn build_challenge(&self) -> String {
        self.challenge(false)
    }

    /// A fresh `WWW-Authenticate` value; `stale` marks a Digest nonce as
    /// merely outdated so clients retry with the same credentials.
    pub fn challenge(&self, stale: bool) -> String {
        match &self.scheme {
            Scheme::Basic => basic_challenge(&self.realm),
            Scheme::Digest(digest) => digest.challenge(&self.realm, stale),
        }
    }
}
