//! Self-validating Digest nonces.
//!
//! A nonce is `base64url(timestamp || random || tag)` where the tag is a
//! truncated HMAC-SHA256 over the first two parts, keyed with a per-process
//! secret. The server can then reject forged nonces and spot stale ones
//! without remembering anything. Replay of a still-fresh nonce is only caught
//! when a [`crate::store::NonceStore`] is plugged in.

use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const TIMESTAMP_LEN: usize = 8;
const RANDOM_LEN: usize = 16;
const TAG_LEN: usize = 16;
const NONCE_LEN: usize = TIMESTAMP_LEN + RANDOM_LEN + TAG_LEN;

/// Clock skew tolerated for timestamps slightly in the future.
const MAX_SKEW_SECS: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceValidity {
    Valid,
    Stale,
    Forged,
}

pub struct NonceIssuer {
    key: [u8; 32],
    ttl: Duration,
}

impl NonceIssuer {
    /// An issuer with a fresh random key. Nonces from a previous process
    /// become invalid, which clients handle as an ordinary re-challenge.
    pub fn new(ttl: Duration) -> Self {
        let mut key = [0u8; 32];
        key[..16].copy_from_slice(uuid::Uuid::new_v4().as_bytes());
        key[16..].copy_from_slice(uuid::Uuid::new_v4().as_bytes());
        Self::with_key(key, ttl)
    }

    pub fn with_key(key: [u8; 32], ttl: Duration) -> Self {
        Self { key, ttl }
    }

    pub fn issue(&self) -> String {
        self.issue_at(Utc::now().timestamp())
    }

    pub fn validate(&self, nonce: &str) -> NonceValidity {
        self.validate_at(nonce, Utc::now().timestamp())
    }

    fn issue_at(&self, timestamp: i64) -> String {
        let mut raw = Vec::with_capacity(NONCE_LEN);
        raw.extend_from_slice(&timestamp.to_be_bytes());
        raw.extend_from_slice(uuid::Uuid::new_v4().as_bytes());

        let tag = self.mac(&raw).finalize().into_bytes();
        raw.extend_from_slice(&tag[..TAG_LEN]);

        URL_SAFE_NO_PAD.encode(raw)
    }

    fn validate_at(&self, nonce: &str, now: i64) -> NonceValidity {
        let raw = match URL_SAFE_NO_PAD.decode(nonce) {
            Ok(raw) if raw.len() == NONCE_LEN => raw,
            _ => return NonceValidity::Forged,
        };

        let (body, tag) = raw.split_at(TIMESTAMP_LEN + RANDOM_LEN);
        if self.mac(body).verify_truncated_left(tag).is_err() {
            return NonceValidity::Forged;
        }

        let mut ts = [0u8; TIMESTAMP_LEN];
        ts.copy_from_slice(&body[..TIMESTAMP_LEN]);
        let issued_at = i64::from_be_bytes(ts);

        if issued_at > now + MAX_SKEW_SECS {
            return NonceValidity::Forged;
        }
        // Inside the skew window the age is negative; count it as zero.
        let age = now.saturating_sub(issued_at).max(0) as u64;
        if age > self.ttl.as_secs() {
            return NonceValidity::Stale;
        }
        NonceValidity::Valid
    }

    fn mac(&self, data: &[u8]) -> HmacSha256 {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.key)
            .unwrap_or_else(|_| unreachable!("HMAC takes keys of any size"));
        mac.update(data);
        mac
    }
}
