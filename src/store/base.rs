use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use super::{memory_store::MemoryNonceStore, no_store::NoStore};
use crate::config::{ConfigError, NonceStoreConfig};

/// Outcome of presenting a nonce and nonce-count to a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceStatus {
    /// Known nonce and a nonce-count higher than any seen before.
    Fresh,
    /// Never issued here, or already evicted.
    Unknown,
    /// Issued here but past its lifetime.
    Expired,
    /// Nonce-count not above the last accepted one.
    Replayed,
    /// The store does not track nonces.
    Untracked,
}

/// The NonceStore trait tracks issued Digest nonces so replayed responses can
/// be refused. Implementations are called inline from request handling and
/// must not block on I/O.
pub trait NonceStore: Send + Sync {
    /// Remember a nonce that was just sent in a challenge.
    fn issue(&self, nonce: &str);
    /// Check a nonce-count for a nonce and record it when accepted.
    fn check(&self, nonce: &str, nc: u32) -> NonceStatus;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Drop expired entries.
    fn cleanup(&self) {}
    fn is_enabled(&self) -> bool {
        // Only NoStore returns false, so logs can say replay checks are off.
        true
    }
}

/// Creates a nonce store from config. If `enabled = false`, returns NoStore.
pub fn create_store(config: &NonceStoreConfig) -> Result<Arc<dyn NonceStore>, ConfigError> {
    if !config.enabled {
        info!("Nonce store is disabled. Using NoStore; digest replay checks are limited to nonce age.");
        return Ok(Arc::new(NoStore::new()));
    }

    if config.capacity == 0 {
        return Err(ConfigError::ZeroNonceCapacity);
    }

    let store = Arc::new(MemoryNonceStore::new(
        Duration::from_secs(config.ttl_secs),
        config.capacity,
    ));

    if tokio::runtime::Handle::try_current().is_ok() {
        store.start_cleanup_task(Duration::from_secs(config.cleanup_interval_secs.max(1)));
    } else {
        debug!("No tokio runtime; nonce store cleanup runs lazily only.");
    }

    info!(
        "Created in-memory nonce store (ttl={}s, capacity={})",
        config.ttl_secs, config.capacity
    );
    Ok(store)
}
