//! In-memory nonce store with TTL expiry and a capacity bound.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::debug;

use super::{NonceStatus, NonceStore};

struct NonceEntry {
    /// Issue sequence number; identifies the matching `order` record.
    seq: u64,
    expires_at: Instant,
    /// Highest nonce-count accepted so far; 0 until first use.
    last_nc: u32,
}

#[derive(Default)]
struct Nonces {
    entries: HashMap<String, NonceEntry>,
    /// Issue order. The TTL is fixed and `Instant` is monotonic, so the
    /// front always holds the earliest expiry. May hold keys already
    /// dropped from `entries`.
    order: VecDeque<QueuedNonce>,
    next_seq: u64,
}

struct QueuedNonce {
    nonce: String,
    seq: u64,
    expires_at: Instant,
}

impl Nonces {
    fn is_current(&self, queued: &QueuedNonce) -> bool {
        self.entries
            .get(&queued.nonce)
            .is_some_and(|entry| entry.seq == queued.seq)
    }

    /// Pop the front record, dropping its entry unless it was re-issued since.
    fn pop_front(&mut self) {
        if let Some(queued) = self.order.pop_front() {
            if self.is_current(&queued) {
                self.entries.remove(&queued.nonce);
            }
        }
    }

    fn pop_expired(&mut self, now: Instant) {
        while self
            .order
            .front()
            .is_some_and(|queued| queued.expires_at <= now)
        {
            self.pop_front();
        }
    }
}

/// Thread-safe in-memory nonce store.
///
/// Expired entries are dropped from the front of the issue queue on `issue`
/// and swept by an optional background task. When the store is full the
/// oldest nonce is evicted, so a client holding it simply gets a stale
/// challenge.
pub struct MemoryNonceStore {
    nonces: Mutex<Nonces>,
    ttl: Duration,
    capacity: usize,
}

impl MemoryNonceStore {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            nonces: Mutex::new(Nonces::default()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Nonces> {
        match self.nonces.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Spawn a tokio task that periodically drops expired nonces. The task
    /// ends once the store itself is dropped.
    pub fn start_cleanup_task(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let store = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(interval);
            loop {
                interval_timer.tick().await;
                match store.upgrade() {
                    Some(store) => store.cleanup(),
                    None => break,
                }
            }
        })
    }
}

impl NonceStore for MemoryNonceStore {
    fn issue(&self, nonce: &str) {
        let mut nonces = self.lock();
        let now = Instant::now();
        let expires_at = now + self.ttl;

        nonces.pop_expired(now);
        // `order` holds a record for every entry, so bounding it bounds both.
        while nonces.order.len() >= self.capacity {
            nonces.pop_front();
        }

        let seq = nonces.next_seq;
        nonces.next_seq += 1;
        nonces.entries.insert(
            nonce.to_string(),
            NonceEntry {
                seq,
                expires_at,
                last_nc: 0,
            },
        );
        nonces.order.push_back(QueuedNonce {
            nonce: nonce.to_string(),
            seq,
            expires_at,
        });
    }

    fn check(&self, nonce: &str, nc: u32) -> NonceStatus {
        let mut nonces = self.lock();
        let now = Instant::now();

        let Some(entry) = nonces.entries.get_mut(nonce) else {
            return NonceStatus::Unknown;
        };

        if entry.expires_at <= now {
            nonces.entries.remove(nonce);
            return NonceStatus::Expired;
        }

        if nc <= entry.last_nc {
            return NonceStatus::Replayed;
        }

        entry.last_nc = nc;
        NonceStatus::Fresh
    }

    fn len(&self) -> usize {
        self.lock().entries.len()
    }

    fn cleanup(&self) {
        let mut nonces = self.lock();
        let now = Instant::now();
        let before = nonces.entries.len();

        nonces.pop_expired(now);
        nonces.entries.retain(|_, entry| entry.expires_at > now);
        let live: VecDeque<QueuedNonce> = std::mem::take(&mut nonces.order)
            .into_iter()
            .filter(|queued| nonces.is_current(queued))
            .collect();
        nonces.order = live;

        let dropped = before - nonces.entries.len();
        if dropped > 0 {
            debug!("Dropped {} expired nonces", dropped);
        }
    }
}
