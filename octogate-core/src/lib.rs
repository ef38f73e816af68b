//! Core library for Octogate, an authenticating rate-limit-aware reverse
//! proxy for the GitHub REST API.
//!
//! This library contains the proxy pipeline shared by the `octogate`
//! binary and its tests:
//!
//! - Token-bucket admission keeping outbound traffic under a configured
//!   quota ([`rate_limiter`])
//! - GitHub App credential minting and exchange ([`app_auth`])
//! - Request dispatch and forwarding to the fixed upstream
//!   ([`request_handler`])
//! - Rate-limit exhaustion backoff on upstream 403 responses
//!   ([`backoff`])

#![forbid(unsafe_code)]

pub mod app_auth;
pub mod backoff;
pub mod defaults;
pub mod error;
pub mod headers;
pub mod rate_limiter;
pub mod request_handler;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use error::OctogateError;
pub use rate_limiter::RateLimiter;
pub use types::{
    AppIdentity, RateBudget, RateLimitConfig, RateLimitEnvelope, RateLimitResources,
    UpstreamConfig,
};
