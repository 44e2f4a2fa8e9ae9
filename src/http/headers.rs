//! Header manipulation for origin-bound requests.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers before forwarding
//! - Record the original host in X-Forwarded-Host
//!
//! # Design Decisions
//! - The Host header is removed so the client derives it from the
//!   origin authority; the original host travels in X-Forwarded-Host
//! - Hop-by-hop set per RFC 9110 §7.6.1

use axum::http::header::HeaderMap;
use axum::http::HeaderValue;

const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Header carrying the host the client originally asked for.
pub const FORWARDED_HOST_HEADER: &str = "x-forwarded-host";

/// Remove hop-by-hop headers that must not be forwarded.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// Record the original Host header value for the origin.
pub fn set_forwarded_host(headers: &mut HeaderMap, host: &str) {
    if let Ok(value) = HeaderValue::from_str(host) {
        headers.insert(FORWARDED_HOST_HEADER, value);
    }
}
