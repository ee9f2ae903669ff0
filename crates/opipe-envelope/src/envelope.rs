//! # Envelope Data Model
//!
//! The universal message unit for inter-agent communication.
//!
//! An envelope is constructed with a fresh id, nonce, and timestamp, signed
//! once, transmitted, and verified at most meaningfully once per receiver.
//! After signing it is treated as immutable except for signature reads.

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::security::current_epoch;

/// Default validity window for an envelope, in seconds.
pub const DEFAULT_TTL_SECONDS: u64 = 300;

/// Number of random bytes in a nonce (hex-encoded on the wire).
const NONCE_BYTES: usize = 16;

/// Semantic kind of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Periodic liveness signal.
    Heartbeat,
    /// Something happened; no response expected.
    Event,
    /// Request for the recipient to act.
    Command,
    /// Acknowledgement of a prior command or event.
    Ack,
}

/// Classification of the sending agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentKind {
    /// A human operator.
    #[serde(rename = "human")]
    Human,
    /// An automated agent.
    #[serde(rename = "non-human")]
    NonHuman,
}

/// The signed, versioned message unit exchanged between agents.
///
/// # Invariants
///
/// - `signature` is always computed over the envelope with the `signature`
///   field itself excluded (see [`crate::canonical`]).
/// - `nonce` is cryptographically random and unique per message within a
///   namespace's replay window.
/// - `ttl_seconds == 0` disables freshness checking; callers should avoid
///   this outside of tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Wire format + trust namespace identifier (e.g. `"opipe-0.1"`).
    pub protocol_version: String,

    /// Semantic kind of this message.
    pub message_type: MessageType,

    /// Unique message identifier.
    pub id: String,

    /// Creation timestamp, seconds since the Unix epoch. Always a JSON
    /// float in the canonical form, even on whole seconds.
    pub issued_at: f64,

    /// Sender identity (agent or role name).
    pub source: String,

    /// Ordered list of recipient identities.
    pub destinations: Vec<String>,

    /// Classification of the sender.
    pub agent_kind: AgentKind,

    /// Links a response back to the request that caused it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,

    /// Validity window in seconds; `0` disables freshness checking.
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,

    /// Single-use random token for replay prevention.
    pub nonce: String,

    /// Lowercase hex HMAC-SHA256 digest over the canonical form.
    /// Absent until the envelope has been signed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    /// The actual payload; opaque to the authenticator.
    pub body: serde_json::Value,
}

fn default_ttl() -> u64 {
    DEFAULT_TTL_SECONDS
}

impl Envelope {
    /// Construct a fresh, unsigned envelope.
    ///
    /// Generates `id` (UUID v4) and `nonce` from a secure random source and
    /// stamps `issued_at` with the current time. No side effects beyond
    /// object creation.
    pub fn new(
        protocol_version: impl Into<String>,
        message_type: MessageType,
        source: impl Into<String>,
        destinations: Vec<String>,
        body: serde_json::Value,
        agent_kind: AgentKind,
        ttl_seconds: u64,
    ) -> Self {
        Self {
            protocol_version: protocol_version.into(),
            message_type,
            id: Uuid::new_v4().to_string(),
            issued_at: current_epoch(),
            source: source.into(),
            destinations,
            agent_kind,
            correlation_id: None,
            ttl_seconds,
            nonce: generate_nonce(),
            signature: None,
            body,
        }
    }

    /// Stamp this envelope as a response to `request` by carrying over its
    /// message id as the correlation id.
    #[must_use]
    pub fn correlate_to(mut self, request: &Envelope) -> Self {
        self.correlation_id = Some(request.id.clone());
        self
    }

    /// Returns true once a signature has been attached.
    #[must_use]
    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// Age of this envelope at the given time, in seconds.
    ///
    /// Clamped at zero for envelopes stamped in the future.
    #[must_use]
    pub fn age(&self, now: f64) -> f64 {
        (now - self.issued_at).max(0.0)
    }
}

/// Generate a cryptographically random nonce, hex-encoded.
fn generate_nonce() -> String {
    let mut bytes = [0u8; NONCE_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
