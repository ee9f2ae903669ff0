//! # Admission Controller
//!
//! The bucket registry and the allow/deny decision path.
//!
//! Buckets are keyed by (client identity, matched route prefix), created on
//! first access from the matched limit profile, and reclaimed by an idle
//! sweep driven by an external scheduler. Per-bucket state carries its own
//! lock so unrelated pairs proceed in parallel; the concurrent map provides
//! atomic locate-or-create, so concurrent first accesses never produce
//! duplicate buckets.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::bucket::{Decision, TokenBucket};
use crate::routes::RouteTable;

/// Composite registry key: (client identity, matched route prefix).
type BucketKey = (String, String);

/// Gate for inbound requests to protected routes.
pub struct AdmissionController {
    table: RouteTable,
    enabled: bool,
    buckets: DashMap<BucketKey, Mutex<TokenBucket>>,
    /// Current time provider (overridable for tests), epoch seconds.
    time_provider: Box<dyn Fn() -> f64 + Send + Sync>,
}

impl std::fmt::Debug for AdmissionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionController")
            .field("enabled", &self.enabled)
            .field("routes", &self.table.len())
            .field("buckets", &self.buckets.len())
            .finish()
    }
}

impl AdmissionController {
    /// Create a controller over a route-limit table, using system time.
    #[must_use]
    pub fn new(table: RouteTable) -> Self {
        Self::with_time_provider(table, system_epoch)
    }

    /// Create with a custom time provider (for testing).
    pub fn with_time_provider<F>(table: RouteTable, provider: F) -> Self
    where
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        Self {
            table,
            enabled: true,
            buckets: DashMap::new(),
            time_provider: Box::new(provider),
        }
    }

    /// Disable or re-enable limiting; disabled controllers admit everything.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Admit or deny a request of cost 1.
    pub fn try_consume(&self, client: &str, route: &str) -> Decision {
        self.try_consume_cost(client, route, 1.0)
    }

    /// Admit or deny a request of the given cost.
    ///
    /// Routes with no matching profile are always admitted. Denial carries
    /// the exact wait until the cost could be covered and debits nothing.
    pub fn try_consume_cost(&self, client: &str, route: &str, cost: f64) -> Decision {
        if !self.enabled {
            return Decision::Allowed;
        }

        let Some((prefix, profile)) = self.table.resolve(route) else {
            return Decision::Allowed;
        };

        let now = (self.time_provider)();
        let key = (client.to_string(), prefix.to_string());
        let bucket = self.buckets.entry(key).or_insert_with(|| {
            debug!(client, prefix, "creating admission bucket");
            Mutex::new(TokenBucket::new(profile.capacity, profile.refill_rate, now))
        });

        let decision = bucket.lock().try_consume(cost, now);
        if let Decision::Denied { retry_after } = decision {
            warn!(client, route, prefix, retry_after, "request denied by admission control");
        }
        decision
    }

    /// Remove buckets idle for longer than `max_idle_seconds`.
    ///
    /// Bounds memory for a registry that otherwise grows with distinct
    /// (client, route) pairs indefinitely. Run periodically by an external
    /// scheduler; returns the number of buckets removed.
    pub fn sweep(&self, max_idle_seconds: f64) -> usize {
        let now = (self.time_provider)();
        // Counted inside the retain predicate: buckets created concurrently
        // while the sweep runs must not skew the removal count.
        let removed = AtomicUsize::new(0);
        self.buckets.retain(|_, bucket| {
            let keep = bucket.get_mut().idle_age(now) <= max_idle_seconds;
            if !keep {
                removed.fetch_add(1, Ordering::Relaxed);
            }
            keep
        });
        let removed = removed.into_inner();
        if removed > 0 {
            debug!(removed, remaining = self.buckets.len(), "swept idle admission buckets");
        }
        removed
    }

    /// Number of live (client, route) buckets.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

/// Current Unix time in seconds, with sub-second precision.
fn system_epoch() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
