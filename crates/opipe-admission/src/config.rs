//! # Admission Configuration
//!
//! Declarative route-limit table defined by the embedding service, with
//! validation at startup.

use serde::Deserialize;
use thiserror::Error;

use crate::registry::AdmissionController;
use crate::routes::{LimitProfile, RouteTable};

/// Admission control configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdmissionConfig {
    /// Enable admission control.
    pub enabled: bool,
    /// Route-prefix limit table.
    pub routes: Vec<RouteLimit>,
    /// Idle threshold for the periodic bucket sweep, in seconds.
    pub sweep_max_idle_seconds: u64,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            routes: Vec::new(),
            sweep_max_idle_seconds: 3_600,
        }
    }
}

/// One route-prefix limit entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteLimit {
    /// Route prefix this limit applies to.
    pub prefix: String,
    /// Maximum tokens (burst size).
    pub capacity: f64,
    /// Tokens refilled per second.
    pub refill_rate: f64,
}

impl AdmissionConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Rejects empty prefixes and non-positive capacities or refill rates;
    /// these are startup errors, not per-request conditions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for route in &self.routes {
            if route.prefix.is_empty() {
                return Err(ConfigError::InvalidRoute("prefix cannot be empty".into()));
            }
            if route.capacity.is_nan() || route.capacity <= 0.0 {
                return Err(ConfigError::InvalidRoute(format!(
                    "{}: capacity must be positive",
                    route.prefix
                )));
            }
            if route.refill_rate.is_nan() || route.refill_rate <= 0.0 {
                return Err(ConfigError::InvalidRoute(format!(
                    "{}: refill_rate must be positive",
                    route.prefix
                )));
            }
        }
        Ok(())
    }

    /// Build the route table described by this configuration.
    #[must_use]
    pub fn route_table(&self) -> RouteTable {
        let mut table = RouteTable::new();
        for route in &self.routes {
            table.insert(
                route.prefix.clone(),
                LimitProfile {
                    capacity: route.capacity,
                    refill_rate: route.refill_rate,
                },
            );
        }
        table
    }

    /// Validate and build an [`AdmissionController`].
    pub fn build(&self) -> Result<AdmissionController, ConfigError> {
        self.validate()?;
        let mut controller = AdmissionController::new(self.route_table());
        controller.set_enabled(self.enabled);
        Ok(controller)
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// A route-limit entry is unusable.
    #[error("invalid route limit: {0}")]
    InvalidRoute(String),
}
