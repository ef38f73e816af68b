//! Default configuration values for Octogate.
//!
//! This module centralizes all default values used throughout Octogate,
//! ensuring consistency between production code and tests.

use std::time::Duration;

/// Default upstream API base URL.
pub const UPSTREAM_API_URL: &str = "https://api.github.com";

/// Default maximum outbound requests per rate limit window.
pub const RATE_LIMIT_REQUESTS: u32 = 5000;

/// Default rate limit window duration in seconds.
pub const RATE_LIMIT_WINDOW_SECS: u64 = 3600;

/// Default rate limit window duration.
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(RATE_LIMIT_WINDOW_SECS);

/// Lifetime of a freshly minted App JWT in seconds.
///
/// GitHub rejects App JWTs whose expiry is more than 10 minutes after
/// issuance, so this is a hard upper bound, not a tunable.
pub const APP_JWT_TTL_SECS: u64 = 600;

/// Accept header value for the versioned GitHub REST API media type.
pub const GITHUB_V3_ACCEPT: &str = "application/vnd.github.v3+json";

/// Default HTTPS listen port.
pub const LISTEN_PORT: u16 = 8443;
