//! Error types for Octogate.
//!
//! This module provides a unified error type for the proxy pipeline,
//! enabling consistent mapping from internal failures to client-visible
//! HTTP responses.
//!
//! None of these errors are retried automatically: each maps directly to
//! a response status. The only built-in backoff in the system is the
//! rate-limit stall in [`crate::backoff`].

use thiserror::Error;

/// Result type alias for Octogate operations.
pub type Result<T> = std::result::Result<T, OctogateError>;

/// Unified error type for the proxy pipeline.
///
/// # Example
///
/// ```
/// use octogate_core::error::OctogateError;
/// use hyper::StatusCode;
///
/// let err = OctogateError::RateLimitExceeded;
/// assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
/// ```
#[derive(Debug, Error)]
pub enum OctogateError {
    /// Local admission denied: the token bucket had no free slot before
    /// the wait was cancelled. The upstream is never contacted.
    #[error("Rate limit exceeded before upstream contact")]
    RateLimitExceeded,

    /// The App private key could not be parsed or the JWT could not be
    /// signed (malformed PEM, wrong algorithm family, corrupted bytes).
    #[error("App JWT signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// The installation token exchange failed: network error, non-JSON
    /// body, or a response without a string `token` field.
    #[error("Installation token exchange failed: {0}")]
    Exchange(String),

    /// A 403 upstream response did not carry the expected rate-limit
    /// envelope. The response relay is aborted.
    #[error("Rate limit envelope decode failed: {0}")]
    EnvelopeDecode(#[from] serde_json::Error),

    /// The inbound request body could not be read from the client.
    #[error("Failed to read request body: {0}")]
    BodyRead(String),

    /// The forwarded upstream call failed at the transport level
    /// (connect, TLS, timeout, or a broken response stream).
    #[error("Upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

impl OctogateError {
    /// Returns the HTTP status code that should be returned to the client.
    pub fn status_code(&self) -> hyper::StatusCode {
        use hyper::StatusCode;

        match self {
            Self::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            Self::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Exchange(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::EnvelopeDecode(_) => StatusCode::BAD_GATEWAY,
            Self::BodyRead(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(err) if err.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Returns a user-friendly error message suitable for HTTP responses.
    ///
    /// The returned message is sanitized and never exposes key material,
    /// upstream URLs, or other internal details to clients.
    pub fn user_message(&self) -> &str {
        match self {
            Self::RateLimitExceeded => "Rate limit exceeded",
            Self::Signing(_) => "Failed to generate JWT",
            Self::Exchange(_) => "Failed to get installation token",
            Self::EnvelopeDecode(_) => "Bad gateway",
            Self::BodyRead(_) => "Failed to read request body",
            Self::Upstream(err) if err.is_timeout() => "Upstream service timeout",
            Self::Upstream(err) if err.is_connect() => "Could not connect to upstream service",
            Self::Upstream(_) => "Upstream service error",
        }
    }

    /// Returns true if this error should be logged at error level.
    ///
    /// Admission denials are expected under load and only warrant
    /// debug/info logging.
    pub fn is_server_error(&self) -> bool {
        !matches!(self, Self::RateLimitExceeded)
    }
}
