//! # Error Types
//!
//! Verification failures and fatal configuration errors.
//!
//! Every verification failure is a distinct variant so callers can log a
//! replay (a potential attack signal) differently from routine staleness.
//! None of these are retried internally; retry policy belongs to the caller.

use thiserror::Error;

/// Terminal failures of a single verification attempt.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VerifyError {
    /// The envelope's validity window has elapsed.
    #[error("envelope expired: age {age_seconds:.1}s exceeds ttl {ttl_seconds}s")]
    Expired {
        /// Seconds since the envelope was issued.
        age_seconds: f64,
        /// The envelope's validity window.
        ttl_seconds: u64,
    },

    /// The nonce was already seen within the replay window.
    #[error("replay detected: nonce {nonce} already seen")]
    Replayed {
        /// The reused nonce.
        nonce: String,
    },

    /// The signature is missing, malformed, or does not match.
    #[error("invalid signature")]
    BadSignature,
}

/// Fatal configuration errors, raised at startup rather than per message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The namespace's secret source has no value for its identifier.
    #[error("missing shared secret: environment variable {var} is not set")]
    MissingSecret {
        /// The environment variable that was consulted.
        var: &'static str,
    },

    /// The secret source resolved to an empty value.
    #[error("empty shared secret: environment variable {var} is set but blank")]
    EmptySecret {
        /// The environment variable that was consulted.
        var: &'static str,
    },
}
