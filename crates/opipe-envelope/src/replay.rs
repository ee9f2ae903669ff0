//! # Replay Defense
//!
//! Caller-owned nonce tracking for replay prevention.
//!
//! ## Design
//!
//! The store is an explicit dependency of verification, never a hidden
//! singleton. A single-process deployment uses [`InMemoryReplayStore`];
//! multi-instance deployments implement [`ReplayStore`] over a shared
//! backing store. The only requirement is an atomic insert-if-absent with
//! O(1) membership check.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::debug;

use crate::security::current_epoch;

/// Hard bound on tracked nonces before an in-line sweep is forced.
pub const MAX_TRACKED_NONCES: usize = 100_000;

/// Set of seen nonces for one trust namespace.
///
/// Implementations must make `insert_if_absent` atomic: two concurrent
/// verifications of the same nonce must never both observe "absent".
pub trait ReplayStore: Send + Sync {
    /// Record `nonce` if it has not been seen.
    ///
    /// Returns `true` if the nonce was fresh (now recorded), `false` if it
    /// was already present (replay).
    fn insert_if_absent(&self, nonce: &str) -> bool;
}

/// In-memory replay store backed by a mutex-guarded map.
///
/// Grows monotonically unless bounded by [`sweep`](Self::sweep), which the
/// owner runs periodically with a threshold aligned to the envelope TTL.
/// A hard size bound forces an in-line sweep on insert so a flood of unique
/// nonces cannot exhaust memory between scheduled sweeps.
pub struct InMemoryReplayStore {
    /// Map of nonce -> insertion time (epoch seconds).
    seen: Mutex<HashMap<String, f64>>,
    /// Sweep threshold used when the hard size bound is hit.
    max_age_seconds: f64,
    /// Current time provider (overridable for tests).
    time_provider: Box<dyn Fn() -> f64 + Send + Sync>,
}

impl std::fmt::Debug for InMemoryReplayStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryReplayStore")
            .field("tracked", &self.len())
            .field("max_age_seconds", &self.max_age_seconds)
            .finish()
    }
}

impl InMemoryReplayStore {
    /// Create a store that retains nonces for `max_age_seconds` once swept.
    ///
    /// The retention window should be at least the largest envelope TTL in
    /// use, otherwise a still-valid envelope could be replayed after its
    /// nonce is swept.
    pub fn new(max_age_seconds: f64) -> Self {
        Self {
            seen: Mutex::new(HashMap::new()),
            max_age_seconds,
            time_provider: Box::new(current_epoch),
        }
    }

    /// Create with a custom time provider (for testing).
    pub fn with_time_provider<F>(max_age_seconds: f64, provider: F) -> Self
    where
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        Self {
            seen: Mutex::new(HashMap::new()),
            max_age_seconds,
            time_provider: Box::new(provider),
        }
    }

    /// Remove nonces older than `max_age_seconds`.
    ///
    /// Run periodically by an external scheduler; returns the number of
    /// entries removed.
    pub fn sweep(&self, max_age_seconds: f64) -> usize {
        let now = (self.time_provider)();
        let mut seen = self.seen.lock();
        let before = seen.len();
        seen.retain(|_, inserted| now - *inserted <= max_age_seconds);
        let removed = before - seen.len();
        if removed > 0 {
            debug!(removed, tracked = seen.len(), "swept expired nonces");
        }
        removed
    }

    /// Number of nonces currently tracked.
    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    /// Returns true if no nonces are tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget all tracked nonces. Primarily for testing.
    pub fn clear(&self) {
        self.seen.lock().clear();
    }
}

impl ReplayStore for InMemoryReplayStore {
    fn insert_if_absent(&self, nonce: &str) -> bool {
        let now = (self.time_provider)();
        let mut seen = self.seen.lock();

        // Forced sweep at the hard bound, under the same lock.
        if seen.len() >= MAX_TRACKED_NONCES {
            seen.retain(|_, inserted| now - *inserted <= self.max_age_seconds);
        }

        if seen.contains_key(nonce) {
            return false;
        }
        seen.insert(nonce.to_string(), now);
        true
    }
}
