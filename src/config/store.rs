use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Settings for the Digest nonce store:
/// - enabled: if false, nonces are not tracked (NoStore) and replay of a
///   fresh nonce goes unnoticed.
/// - ttl_secs / capacity: bound how long and how many nonces are kept.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct NonceStoreConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

fn default_ttl_secs() -> u64 {
    300
}

fn default_capacity() -> usize {
    4096
}

fn default_cleanup_interval_secs() -> u64 {
    60
}

impl Default for NonceStoreConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl_secs: default_ttl_secs(),
            capacity: default_capacity(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}
