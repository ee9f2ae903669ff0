//! # Token Bucket
//!
//! The token bucket admits bursts up to `capacity` and refills continuously
//! at `refill_rate` tokens per second. Refill is lazy, computed on access
//! from elapsed time; there is no background clock.
//!
//! ## Invariants
//!
//! - `0 <= tokens <= capacity` after every operation.
//! - A denied consume mutates nothing beyond the lazy refill; there is no
//!   partial debit.

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    /// Request admitted; the cost was debited.
    Allowed,
    /// Request denied; retry no sooner than the hint.
    Denied {
        /// Seconds until enough tokens will have accrued for the same cost.
        retry_after: f64,
    },
}

impl Decision {
    /// Check if the request was admitted.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Token bucket state for one (client, route) pair.
#[derive(Debug, Clone)]
pub struct TokenBucket {
    /// Maximum tokens (burst size).
    capacity: f64,
    /// Tokens added per second.
    refill_rate: f64,
    /// Current level.
    tokens: f64,
    /// Timestamp of the last lazy refill, epoch seconds.
    last_refill: f64,
}

impl TokenBucket {
    /// Create a full bucket as of `now`.
    #[must_use]
    pub fn new(capacity: f64, refill_rate: f64, now: f64) -> Self {
        Self {
            capacity,
            refill_rate,
            tokens: capacity,
            last_refill: now,
        }
    }

    /// Attempt to consume `cost` tokens as of `now`.
    ///
    /// Refills lazily first, then either debits and admits, or computes the
    /// wait until `cost` tokens will be available and denies.
    pub fn try_consume(&mut self, cost: f64, now: f64) -> Decision {
        self.refill(now);

        if self.tokens >= cost {
            self.tokens -= cost;
            return Decision::Allowed;
        }

        Decision::Denied {
            retry_after: (cost - self.tokens) / self.refill_rate,
        }
    }

    /// Add tokens for the time elapsed since the last refill.
    fn refill(&mut self, now: f64) {
        let elapsed = (now - self.last_refill).max(0.0);
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
        self.last_refill = now;
    }

    /// Current token level.
    #[must_use]
    pub fn tokens(&self) -> f64 {
        self.tokens
    }

    /// Seconds since the last refill, used by the idle sweep.
    #[must_use]
    pub fn idle_age(&self, now: f64) -> f64 {
        (now - self.last_refill).max(0.0)
    }
}
