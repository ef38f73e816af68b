//! Startup banner and configuration display.

use crate::{args::Args, config::Settings, env_vars};
use std::env;

/// Print startup banner with configuration
pub fn print_startup_info(args: &Args, settings: &Settings) {
    if args.quiet {
        // Quiet mode: only essential information
        println!(
            "🚀 Octogate v{} starting on port {}",
            env!("CARGO_PKG_VERSION"),
            args.port
        );
        return;
    }

    // Normal/verbose mode: full configuration display
    println!("🐙 {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    println!("   {}", env!("CARGO_PKG_DESCRIPTION"));
    println!();
    println!("📡 Network Configuration:");
    println!("   Listen Port:    {}", args.port);
    println!("   Upstream:       {}", settings.upstream.api_base);
    println!();

    println!("⚡ Rate Limiting:");
    println!(
        "   Max Requests:   {} per {} seconds",
        settings.rate_limit.max_requests,
        settings.rate_limit.window_duration.as_secs()
    );
    println!(
        "   Refill Interval: {} ms",
        settings.rate_limit.refill_interval().as_millis()
    );

    println!("🔑 Authentication:");
    if settings.identity.is_configured() {
        println!("   Mode:           GitHub App (ID {})", settings.identity.app_id);
        println!("   Installation:   {}", settings.identity.installation_id);
    } else {
        println!("   Mode:           Pass-through (no App configured)");
    }

    // Show environment configuration in verbose mode
    if args.verbose {
        print_env_config();
    }

    println!();
    println!("🚀 Server starting...");
}

/// Print environment variable configuration status (used in verbose mode)
fn print_env_config() {
    println!();
    println!("🔧 Environment Variables:");

    for &var_name in env_vars::all_env_vars() {
        match env::var(var_name) {
            Ok(value) => {
                // Mask sensitive values
                let display_value = if var_name.contains("KEY") {
                    "[CONFIGURED]".to_string()
                } else {
                    value
                };
                println!("   {var_name:<25} = {display_value}");
            }
            Err(_) => {
                println!("   {var_name:<25} = [NOT SET]");
            }
        }
    }
}
