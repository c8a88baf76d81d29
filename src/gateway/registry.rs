//! Registry of in-flight requests keyed by fingerprint.
//!
//! At most one entry exists per fingerprint. Registering a fingerprint that is
//! already in flight cancels the earlier call and replaces its entry in the
//! same map operation; the latest call always wins. Entries are released by a
//! guard, so every exit path of a call clears its own entry, and only its own:
//! a superseded call settling late never evicts the call that replaced it.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use tracing::debug;

use super::fingerprint::Fingerprint;

#[derive(Debug)]
struct PendingEntry {
    id: u64,
    token: CancellationToken,
}

/// In-flight requests, one per fingerprint.
#[derive(Debug, Default)]
pub struct PendingRegistry {
    entries: DashMap<Fingerprint, PendingEntry>,
    next_id: AtomicU64,
}

impl PendingRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a dispatch, cancelling any call already in flight with the
    /// same fingerprint.
    pub fn register(&self, fingerprint: Fingerprint) -> PendingGuard<'_> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        let entry = PendingEntry {
            id,
            token: token.clone(),
        };
        if let Some(previous) = self.entries.insert(fingerprint.clone(), entry) {
            debug!(%fingerprint, superseded = previous.id, by = id, "cancelling superseded request");
            previous.token.cancel();
        }
        PendingGuard {
            registry: self,
            fingerprint,
            id,
            token,
        }
    }

    /// Number of requests in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.entries.contains_key(fingerprint)
    }

    fn release(&self, fingerprint: &Fingerprint, id: u64) {
        if self
            .entries
            .remove_if(fingerprint, |_, entry| entry.id == id)
            .is_some()
        {
            debug!(%fingerprint, id, "pending request released");
        }
    }
}

/// Registration of one dispatch; releases its entry on drop.
#[derive(Debug)]
pub struct PendingGuard<'a> {
    registry: &'a PendingRegistry,
    fingerprint: Fingerprint,
    id: u64,
    token: CancellationToken,
}

impl PendingGuard<'_> {
    /// Completes when an identical request supersedes this one.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    #[must_use]
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Releases the entry now.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.registry.release(&self.fingerprint, self.id);
    }
}
