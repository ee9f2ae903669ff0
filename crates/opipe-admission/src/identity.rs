//! # Client Identity Resolution
//!
//! Maps an inbound request to the identity its buckets are keyed by.
//!
//! Preference order: the first entry of the forwarded-address chain, then
//! the real-IP header, then the transport-level peer address. Requests with
//! none of these share the [`UNKNOWN_CLIENT`] bucket — an accepted trade-off
//! that gives all unidentifiable clients one collective limit.

use std::net::{IpAddr, SocketAddr};

use http::HeaderMap;

/// Shared identity for clients that cannot be identified.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Resolve the client identity for an inbound request.
#[must_use]
pub fn resolve_client(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    // X-Forwarded-For: first entry is the original client
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(chain) = forwarded.to_str() {
            if let Some(first) = chain.split(',').next() {
                if let Ok(ip) = first.trim().parse::<IpAddr>() {
                    return ip.to_string();
                }
            }
        }
    }

    // X-Real-IP
    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(value) = real_ip.to_str() {
            if let Ok(ip) = value.trim().parse::<IpAddr>() {
                return ip.to_string();
            }
        }
    }

    // Transport-level peer address
    if let Some(addr) = peer {
        return addr.ip().to_string();
    }

    UNKNOWN_CLIENT.to_string()
}
