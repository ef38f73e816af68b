use clap::Parser;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use octogate::args::Args;
use octogate::{config, server, tls};
use octogate_core::{RateLimiter, request_handler};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Validate arguments
    if let Err(err) = args.validate() {
        eprintln!("❌ Configuration error: {err}");
        std::process::exit(1);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = config::load();
    server::print_startup_info(&args, &settings);

    let tls_acceptor = match tls::build_acceptor(&args.cert, &args.key) {
        Ok(acceptor) => acceptor,
        Err(err) => {
            eprintln!("❌ TLS setup failed: {err}");
            std::process::exit(1);
        }
    };

    // Shared pipeline state
    let limiter = RateLimiter::new(&settings.rate_limit);
    let identity = Arc::new(settings.identity);
    let upstream = Arc::new(settings.upstream);
    let http_client = match reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .connect_timeout(Duration::from_secs(10))
        .build()
    {
        Ok(client) => client,
        Err(err) => {
            eprintln!("❌ Failed to build HTTP client: {err}");
            std::process::exit(1);
        }
    };

    // Bind to address
    let bind_addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = match TcpListener::bind(bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            eprintln!("❌ Failed to bind to port {}: {}", args.port, err);
            std::process::exit(1);
        }
    };

    println!("✅ Octogate is running on port {}", args.port);

    // Accept connections
    loop {
        let (stream, addr) = match listener.accept().await {
            Ok(conn) => conn,
            Err(err) => {
                eprintln!("⚠️  Failed to accept connection: {err}");
                continue;
            }
        };

        if args.verbose && !args.quiet {
            println!("📡 New connection from {addr}");
        }

        let tls_acceptor = tls_acceptor.clone();
        let limiter = limiter.clone();
        let identity = identity.clone();
        let upstream = upstream.clone();
        let http_client = http_client.clone();
        let verbose = args.verbose;
        let quiet = args.quiet;

        tokio::task::spawn(async move {
            let tls_stream = match tls_acceptor.accept(stream).await {
                Ok(tls_stream) => tls_stream,
                Err(err) => {
                    if !quiet {
                        eprintln!("⚠️  TLS handshake failed from {addr}: {err}");
                    }
                    return;
                }
            };

            let io = TokioIo::new(tls_stream);
            let service = service_fn(move |req| {
                request_handler::handle_request(
                    req,
                    limiter.clone(),
                    identity.clone(),
                    upstream.clone(),
                    http_client.clone(),
                )
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                if !quiet {
                    if verbose {
                        eprintln!("⚠️  Connection error from {addr}: {err}");
                    } else {
                        eprintln!("⚠️  Connection error: {err}");
                    }
                }
            }
        });
    }
}
