//! # Canonical Serialized Form
//!
//! The deterministic encoding that signatures are computed over.
//!
//! The signed form is the envelope with the `signature` field removed,
//! serialized as compact JSON with object keys in sorted order. Any
//! implementation (in any language) must reproduce these bytes exactly to
//! interoperate; the sorted-key compact encoding matches
//! `json.dumps(..., sort_keys=True, separators=(",", ":"))`.
//!
//! `issued_at` is always a JSON float: a whole-second timestamp renders as
//! `1700000000.0`, never `1700000000`. Peer implementations must sign the
//! float form too, or their digests will not match ours.

use crate::envelope::Envelope;

/// Serialize an envelope to its canonical signed form.
///
/// The `signature` field is excluded regardless of whether it is set, so
/// signing and verification derive identical bytes from the same envelope.
///
/// # Panics
///
/// Never panics for envelopes built through this crate: every field
/// serializes to JSON and the top level is always an object.
pub fn canonical_bytes(envelope: &Envelope) -> Vec<u8> {
    // serde_json maps are BTreeMaps by default, so converting to Value
    // sorts object keys at every level.
    let mut value = serde_json::to_value(envelope)
        .unwrap_or_else(|_| serde_json::Value::Object(serde_json::Map::new()));

    if let Some(obj) = value.as_object_mut() {
        obj.remove("signature");
    }

    serde_json::to_vec(&value).unwrap_or_default()
}
