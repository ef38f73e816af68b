//! Environment variable names used throughout Octogate configuration

/// GitHub App identity
pub const GITHUB_APP_ID: &str = "GITHUB_APP_ID";
pub const GITHUB_APP_PRIVATE_KEY: &str = "GITHUB_APP_PRIVATE_KEY";
pub const GITHUB_INSTALLATION_ID: &str = "GITHUB_INSTALLATION_ID";

/// Rate limiting configuration
pub const RATE_LIMIT_REQUESTS: &str = "RATE_LIMIT_REQUESTS";
pub const RATE_LIMIT_WINDOW_SECS: &str = "RATE_LIMIT_WINDOW_SECS";

/// Upstream configuration
pub const UPSTREAM_API_URL: &str = "UPSTREAM_API_URL";

/// Get all environment variable names for documentation/validation
pub fn all_env_vars() -> &'static [&'static str] {
    &[
        GITHUB_APP_ID,
        GITHUB_APP_PRIVATE_KEY,
        GITHUB_INSTALLATION_ID,
        RATE_LIMIT_REQUESTS,
        RATE_LIMIT_WINDOW_SECS,
        UPSTREAM_API_URL,
    ]
}
