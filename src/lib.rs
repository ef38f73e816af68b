//! Octogate - an authenticating gate in front of the GitHub API
//!
//! A reverse proxy that authenticates as a GitHub App and keeps outbound
//! traffic under the upstream rate limit.
//!
//! # Overview
//!
//! Octogate terminates TLS, admits requests through a token-bucket gate,
//! mints a GitHub App installation token per request (or passes the
//! caller's `Authorization` through), forwards to the upstream API, and
//! stalls on upstream rate-limit exhaustion instead of hammering it.
//!
//! # Modules
//!
//! - [`args`] - Command line argument parsing
//! - [`config`] - Configuration loading from environment variables
//! - [`env_vars`] - Environment variable constants
//! - [`server`] - Startup banner
//! - [`tls`] - TLS acceptor setup
//!
//! # Re-exports from octogate-core
//!
//! Core functionality is provided by the `octogate-core` crate:
//! - [`rate_limiter`] - Token-bucket admission gate
//! - [`app_auth`] - App JWT minting and installation-token exchange
//! - [`request_handler`] - Request dispatch and forwarding
//! - [`backoff`] - Upstream rate-limit exhaustion handling

#![forbid(unsafe_code)]

pub mod args;
pub mod config;
pub mod env_vars;
pub mod server;
pub mod tls;

// Re-export octogate-core modules
pub use octogate_core::app_auth;
pub use octogate_core::backoff;
pub use octogate_core::rate_limiter;
pub use octogate_core::request_handler;
pub use octogate_core::types;

// Re-export commonly used items at crate root
pub use config::{Settings, load};
pub use octogate_core::{
    AppIdentity, OctogateError, RateLimitConfig, RateLimiter, UpstreamConfig,
};
