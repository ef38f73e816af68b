//! HTTP header constants for Octogate.
//!
//! Centralizes the header names used throughout the codebase, avoiding
//! magic strings and ensuring consistency.

/// Authorization header (replaced or passed through per policy).
pub const AUTHORIZATION: &str = "authorization";

/// Accept header (set on token exchange requests).
pub const ACCEPT: &str = "accept";

/// Host header (rewritten to the upstream host, never forwarded).
pub const HOST: &str = "host";

/// Content-Length header (recomputed by the outbound transport).
pub const CONTENT_LENGTH: &str = "content-length";

/// Hop-by-hop headers that must not be forwarded in either direction.
pub const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

/// Check if a (lowercase) header name is hop-by-hop.
pub fn is_hop_by_hop(header_name: &str) -> bool {
    HOP_BY_HOP.contains(&header_name)
}
