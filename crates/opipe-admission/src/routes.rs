//! # Route-Limit Table
//!
//! Declarative mapping from route prefixes to limit profiles. Resolution is
//! by longest matching registered prefix; a route with no matching prefix
//! has no limiting configured and is always admitted.

/// Bucket parameters for one route prefix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimitProfile {
    /// Maximum tokens (burst size).
    pub capacity: f64,
    /// Tokens refilled per second.
    pub refill_rate: f64,
}

/// Ordered registry of (prefix, profile) pairs.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<(String, LimitProfile)>,
}

impl RouteTable {
    /// Create an empty table (every route admitted).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a limit profile for a route prefix.
    ///
    /// Re-registering a prefix replaces its profile.
    pub fn insert(&mut self, prefix: impl Into<String>, profile: LimitProfile) {
        let prefix = prefix.into();
        if let Some(entry) = self.entries.iter_mut().find(|(p, _)| *p == prefix) {
            entry.1 = profile;
        } else {
            self.entries.push((prefix, profile));
        }
    }

    /// Resolve a route to its limit profile by longest matching prefix.
    #[must_use]
    pub fn resolve(&self, route: &str) -> Option<(&str, &LimitProfile)> {
        self.entries
            .iter()
            .filter(|(prefix, _)| route.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(prefix, profile)| (prefix.as_str(), profile))
    }

    /// Number of registered prefixes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no prefixes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
