//! # Signing and Verification
//!
//! The single, authoritative implementation of envelope security checks.
//! Every trust namespace routes through these functions; namespaces differ
//! only in which secret they supply.
//!
//! ## Verification Steps (in order)
//!
//! 1. **Freshness**: Reject expired envelopes. No nonce is recorded for an
//!    expired message since it is already invalid.
//! 2. **Replay**: Reject nonces already present in the supplied store. The
//!    nonce is recorded before the signature check; a forged message burning
//!    a nonce cannot be replayed later with a valid signature under the same
//!    nonce, so this ordering is a deliberate simplification.
//! 3. **Signature**: Recompute the HMAC over the canonical form and compare
//!    in constant time.

use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

use crate::canonical::canonical_bytes;
use crate::envelope::Envelope;
use crate::errors::VerifyError;
use crate::replay::ReplayStore;

type HmacSha256 = Hmac<Sha256>;

/// Compute the signature for an envelope.
///
/// HMAC-SHA256 keyed by `secret` over the canonical serialized form (the
/// envelope with `signature` excluded), returned as a lowercase hex digest.
/// Pure: the same envelope and secret always yield the same signature.
pub fn sign_envelope(envelope: &Envelope, secret: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(&canonical_bytes(envelope));
    hex::encode(mac.finalize().into_bytes())
}

/// Verify an envelope against `secret`, with optional replay tracking.
///
/// Uses the current system time for the freshness check; see
/// [`verify_envelope_at`] for an injected clock.
pub fn verify_envelope(
    envelope: &Envelope,
    secret: &[u8],
    replay: Option<&dyn ReplayStore>,
) -> Result<(), VerifyError> {
    verify_envelope_at(envelope, secret, replay, current_epoch())
}

/// Verify an envelope as of the given time.
///
/// All three failure kinds are terminal for this attempt; nothing is
/// retried internally.
pub fn verify_envelope_at(
    envelope: &Envelope,
    secret: &[u8],
    replay: Option<&dyn ReplayStore>,
    now: f64,
) -> Result<(), VerifyError> {
    // 1. Freshness (ttl_seconds == 0 disables the check)
    if envelope.ttl_seconds > 0 {
        let age = now - envelope.issued_at;
        if age > envelope.ttl_seconds as f64 {
            return Err(VerifyError::Expired {
                age_seconds: age,
                ttl_seconds: envelope.ttl_seconds,
            });
        }
    }

    // 2. Replay
    if let Some(store) = replay {
        if !store.insert_if_absent(&envelope.nonce) {
            warn!(
                nonce = %envelope.nonce,
                source = %envelope.source,
                "replay detected"
            );
            return Err(VerifyError::Replayed {
                nonce: envelope.nonce.clone(),
            });
        }
    }

    // 3. Signature (constant-time comparison via Mac::verify_slice)
    let claimed = match envelope.signature.as_deref().map(hex::decode) {
        Some(Ok(bytes)) => bytes,
        _ => {
            warn!(source = %envelope.source, "missing or malformed signature");
            return Err(VerifyError::BadSignature);
        }
    };

    let mut mac =
        HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(&canonical_bytes(envelope));
    if mac.verify_slice(&claimed).is_err() {
        warn!(source = %envelope.source, id = %envelope.id, "signature mismatch");
        return Err(VerifyError::BadSignature);
    }

    Ok(())
}

/// Current Unix time in seconds, with sub-second precision.
///
/// Returns 0.0 if the system clock is before the epoch rather than panicking.
pub fn current_epoch() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
