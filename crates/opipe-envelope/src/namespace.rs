//! # Trust Namespaces
//!
//! A trust namespace is a protocol variant with its own version string and
//! its own shared secret. Namespaces share the wire format but never share
//! secrets, so an envelope valid in one namespace is meaningless in every
//! other, even with byte-identical content. This is the property that lets
//! multiple independent trust domains coexist on one wire format.
//!
//! The namespace set is a closed enum resolved at compile time; there is no
//! runtime string dispatch from version strings to secrets.

use serde_json::Value;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::envelope::{AgentKind, Envelope, MessageType};
use crate::errors::{ConfigError, VerifyError};
use crate::replay::ReplayStore;
use crate::security::{sign_envelope, verify_envelope_at};

/// The closed set of trust namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrustNamespace {
    /// Inter-agent orchestration traffic.
    Opipe,
    /// Observability and insight traffic.
    Oilluminate,
    /// Inventory and asset traffic.
    Iimsibis,
}

impl TrustNamespace {
    /// The protocol version string this namespace stamps on its envelopes.
    #[must_use]
    pub const fn protocol_version(self) -> &'static str {
        match self {
            Self::Opipe => "opipe-0.1",
            Self::Oilluminate => "oilluminate-0.1",
            Self::Iimsibis => "iimsibis-0.1",
        }
    }

    /// The environment variable holding this namespace's shared secret.
    #[must_use]
    pub const fn secret_var(self) -> &'static str {
        match self {
            Self::Opipe => "OPIPE_SHARED_SECRET",
            Self::Oilluminate => "OILLUMINATE_SHARED_SECRET",
            Self::Iimsibis => "IIMSIBIS_SHARED_SECRET",
        }
    }
}

/// An opaque shared secret that zeroizes its memory on drop.
///
/// This crate never generates or rotates key material; secrets arrive from
/// an external source and are treated as opaque bytes.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret {
    inner: Vec<u8>,
}

impl SharedSecret {
    /// Wrap raw secret bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            inner: bytes.into(),
        }
    }

    /// Expose the secret bytes for keying. Use immediately; do not hold on
    /// to the returned slice.
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        &self.inner
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the actual secret
        f.write_str("SharedSecret(***)")
    }
}

/// Signs and verifies envelopes for one trust namespace.
///
/// A thin specialization fixing the protocol version and the secret; all
/// actual checks live in [`crate::security`].
pub struct NamespaceAuthenticator {
    namespace: TrustNamespace,
    secret: SharedSecret,
}

impl NamespaceAuthenticator {
    /// Resolve the namespace's secret from its environment variable.
    ///
    /// # Errors
    ///
    /// A missing or blank variable is a fatal [`ConfigError`] and should
    /// stop startup; it is never surfaced as a per-message failure.
    pub fn from_env(namespace: TrustNamespace) -> Result<Self, ConfigError> {
        let var = namespace.secret_var();
        let raw = std::env::var(var).map_err(|_| ConfigError::MissingSecret { var })?;
        if raw.trim().is_empty() {
            return Err(ConfigError::EmptySecret { var });
        }
        Ok(Self::with_secret(namespace, SharedSecret::new(raw.into_bytes())))
    }

    /// Bind a namespace to a secret from a non-environment source.
    #[must_use]
    pub fn with_secret(namespace: TrustNamespace, secret: SharedSecret) -> Self {
        Self { namespace, secret }
    }

    /// The namespace this authenticator serves.
    #[must_use]
    pub fn namespace(&self) -> TrustNamespace {
        self.namespace
    }

    /// Construct a fresh, unsigned envelope stamped with this namespace's
    /// protocol version.
    #[must_use]
    pub fn construct(
        &self,
        message_type: MessageType,
        source: impl Into<String>,
        destinations: Vec<String>,
        body: Value,
        agent_kind: AgentKind,
        ttl_seconds: u64,
    ) -> Envelope {
        Envelope::new(
            self.namespace.protocol_version(),
            message_type,
            source,
            destinations,
            body,
            agent_kind,
            ttl_seconds,
        )
    }

    /// Sign an envelope, storing the hex digest in its `signature` field.
    #[must_use]
    pub fn sign(&self, mut envelope: Envelope) -> Envelope {
        envelope.signature = Some(sign_envelope(&envelope, self.secret.expose()));
        envelope
    }

    /// Verify an envelope under this namespace's secret.
    ///
    /// An envelope stamped with a different namespace's protocol version is
    /// rejected outright; its signature could never verify here anyway.
    pub fn verify(
        &self,
        envelope: &Envelope,
        replay: Option<&dyn ReplayStore>,
    ) -> Result<(), VerifyError> {
        self.verify_at(envelope, replay, crate::security::current_epoch())
    }

    /// Verify as of the given time (for deterministic tests).
    pub fn verify_at(
        &self,
        envelope: &Envelope,
        replay: Option<&dyn ReplayStore>,
        now: f64,
    ) -> Result<(), VerifyError> {
        if envelope.protocol_version != self.namespace.protocol_version() {
            return Err(VerifyError::BadSignature);
        }
        verify_envelope_at(envelope, self.secret.expose(), replay, now)
    }
}
