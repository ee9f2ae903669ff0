//! # Opipe Envelope
//!
//! The signed, versioned message unit exchanged between agents, and the
//! verification rules that make it trustworthy.
//!
//! ## Security Properties
//!
//! - **Integrity**: Every envelope carries an HMAC-SHA256 signature over its
//!   canonical serialized form.
//! - **Freshness**: Envelopes expire after `ttl_seconds`; stale messages are
//!   rejected before any other check.
//! - **Replay Prevention**: Each envelope carries a single-use random nonce,
//!   tracked in a caller-owned [`ReplayStore`].
//! - **Namespace Isolation**: Trust namespaces share the wire format but use
//!   disjoint secrets, so a message valid in one namespace always fails
//!   verification in another.
//!
//! ## Design Principles
//!
//! - The replay store is passed in explicitly, never a hidden singleton; the
//!   caller decides between an in-process set and a shared store.
//! - Signing and verification are pure computations apart from the replay
//!   store; there are no suspension points in the hot path.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod canonical;
pub mod envelope;
pub mod errors;
pub mod namespace;
pub mod replay;
pub mod security;

pub use envelope::{AgentKind, Envelope, MessageType, DEFAULT_TTL_SECONDS};
pub use errors::{ConfigError, VerifyError};
pub use namespace::{NamespaceAuthenticator, SharedSecret, TrustNamespace};
pub use replay::{InMemoryReplayStore, ReplayStore};
pub use security::{current_epoch, sign_envelope, verify_envelope, verify_envelope_at};
