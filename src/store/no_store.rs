use super::{NonceStatus, NonceStore};

/// A store that remembers nothing. Digest verification then relies on the
/// nonce signature and age alone.
pub struct NoStore;

impl NoStore {
    pub fn new() -> Self {
        NoStore
    }
}

impl Default for NoStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NonceStore for NoStore {
    fn issue(&self, _nonce: &str) {}

    fn check(&self, _nonce: &str, _nc: u32) -> NonceStatus {
        NonceStatus::Untracked
    }

    fn len(&self) -> usize {
        0
    }

    fn is_enabled(&self) -> bool {
        false
    }
}
