//! Command line argument parsing for Octogate.
//!
//! This module defines the CLI interface using [`clap`] for argument parsing.
//! It provides configuration for the TLS material, listen port, and output
//! verbosity.
//!
//! # Example
//!
//! ```no_run
//! use octogate::args::Args;
//! use clap::Parser;
//!
//! let args = Args::parse();
//! if let Err(e) = args.validate() {
//!     eprintln!("Configuration error: {}", e);
//!     std::process::exit(1);
//! }
//! ```

use clap::Parser;

/// Command line arguments for Octogate.
///
/// The GitHub App identity, rate-limit quota, and upstream URL come from
/// environment variables (see the after-help text); the CLI only carries
/// what the listener itself needs.
///
/// # Example
///
/// ```no_run
/// use octogate::args::Args;
/// use clap::Parser;
///
/// let args = Args::parse();
/// println!("Listening on port {}", args.port);
/// ```
#[derive(Parser)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(about = env!("CARGO_PKG_DESCRIPTION"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(
    long_about = "🐙 An authenticating, rate-limit-aware reverse proxy for the GitHub API\nMints GitHub App installation tokens per request and keeps outbound\ntraffic under a configurable quota\n\nExample usage:\n  octogate --cert cert.pem --key key.pem\n  octogate --cert cert.pem --key key.pem -p 9443 --verbose"
)]
#[command(
    after_help = "Environment variables:\n  GITHUB_APP_ID           GitHub App identifier (enables token minting)\n  GITHUB_APP_PRIVATE_KEY  PEM-encoded RSA private key contents\n  GITHUB_INSTALLATION_ID  Installation to mint tokens for\n  RATE_LIMIT_REQUESTS     Max upstream requests per window (default: 5000)\n  RATE_LIMIT_WINDOW_SECS  Rate limit window seconds (default: 3600)\n  UPSTREAM_API_URL        Upstream base URL (default: https://api.github.com)"
)]
pub struct Args {
    /// Path to the PEM certificate chain presented to clients
    #[arg(
        long,
        help = "Path to the TLS certificate chain (PEM)",
        value_name = "FILE"
    )]
    pub cert: String,

    /// Path to the PEM private key matching the certificate
    #[arg(long, help = "Path to the TLS private key (PEM)", value_name = "FILE")]
    pub key: String,

    /// Port to listen on for incoming HTTPS requests
    #[arg(
        long,
        short = 'p',
        help = "Listen port for incoming connections",
        value_name = "PORT",
        default_value_t = octogate_core::defaults::LISTEN_PORT
    )]
    pub port: u16,

    /// Enable verbose output
    #[arg(
        long,
        short = 'v',
        help = "Show detailed configuration and startup information"
    )]
    pub verbose: bool,

    /// Enable quiet mode (minimal output)
    #[arg(
        long,
        short = 'q',
        help = "Suppress configuration output, show only essential messages",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl Args {
    /// Validates the parsed command line arguments.
    ///
    /// Performs the following validations:
    /// - The listen port must be greater than 0
    /// - Certificate and key paths must be non-empty and point to
    ///   readable files
    ///
    /// # Example
    ///
    /// ```
    /// use octogate::args::Args;
    /// use clap::Parser;
    ///
    /// let args = Args::try_parse_from([
    ///     "octogate", "--cert", "/nonexistent.pem", "--key", "/nonexistent.pem",
    /// ])
    /// .unwrap();
    /// assert!(args.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("Port must be greater than 0".to_string());
        }

        if self.cert.is_empty() || self.key.is_empty() {
            return Err("Certificate and key paths cannot be empty".to_string());
        }

        if !std::path::Path::new(&self.cert).is_file() {
            return Err(format!("Certificate file not found: '{}'", self.cert));
        }

        if !std::path::Path::new(&self.key).is_file() {
            return Err(format!("Key file not found: '{}'", self.key));
        }

        Ok(())
    }
}
