use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::store::NonceStoreConfig;
use crate::auth::digest::DigestAlgorithm;

/// Which challenge protected routes answer with.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    #[default]
    Basic,
    Digest,
    /// Serve protected routes without authentication.
    None,
}

/// The credentials and scheme guarding protected routes.
#[derive(Deserialize, Serialize, JsonSchema, Clone)]
pub struct AuthConfig {
    #[serde(default)]
    pub scheme: AuthScheme,
    #[serde(default = "default_realm")]
    pub realm: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default)]
    pub digest: DigestConfig,
    #[serde(default)]
    pub nonce_store: NonceStoreConfig,
}

fn default_realm() -> String {
    "authgate".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            scheme: AuthScheme::default(),
            realm: default_realm(),
            username: String::new(),
            password: String::new(),
            digest: DigestConfig::default(),
            nonce_store: NonceStoreConfig::default(),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("scheme", &self.scheme)
            .field("realm", &self.realm)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("digest", &self.digest)
            .field("nonce_store", &self.nonce_store)
            .finish()
    }
}

/// Digest-only settings.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
pub struct DigestConfig {
    #[serde(default)]
    pub algorithm: DigestAlgorithm,
    /// Seconds a nonce stays acceptable before clients get `stale=true`.
    #[serde(default = "default_nonce_ttl_secs")]
    pub nonce_ttl_secs: u64,
}

fn default_nonce_ttl_secs() -> u64 {
    300
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            algorithm: DigestAlgorithm::default(),
            nonce_ttl_secs: default_nonce_ttl_secs(),
        }
    }
}
