//! # Opipe Admission
//!
//! Per-client, per-route token-bucket admission control guarding the
//! request-processing boundary of a gateway.
//!
//! ## Flow
//!
//! Every inbound request to a protected route passes through
//! [`AdmissionController::try_consume`] before reaching business logic. The
//! controller resolves the route to a configured limit profile by longest
//! matching prefix, lazily refills the client's bucket, and either admits
//! the request or denies it with the exact wait before retry. Denial is an
//! expected outcome, not an error; no tokens are consumed on denial and
//! nothing ever blocks waiting for tokens.
//!
//! For a denied request the embedding gateway is expected to respond with a
//! 429-class status carrying the retry hint; this crate only produces the
//! decision.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod bucket;
pub mod config;
pub mod identity;
pub mod registry;
pub mod routes;

pub use bucket::{Decision, TokenBucket};
pub use config::{AdmissionConfig, ConfigError, RouteLimit};
pub use identity::{resolve_client, UNKNOWN_CLIENT};
pub use registry::AdmissionController;
pub use routes::{LimitProfile, RouteTable};
