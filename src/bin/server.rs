//! shiftwire Server Binary
//!
//! Accepts enciphered text and answers with the decoded plaintext.

use clap::Parser;
use shiftwire::network::ConnectionServer;
use shiftwire::Config;
use tracing_subscriber::{fmt, EnvFilter};

/// shiftwire Server
#[derive(Parser, Debug)]
#[command(name = "shiftwire-server")]
#[command(about = "Decodes Caesar-shifted text sent by shiftwire clients")]
#[command(after_help = "Example: shiftwire-server 5000")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(value_parser = clap::value_parser!(u16).range(1..))]
    port: u16,

    /// Timeout for each field exchanged on a connection, in milliseconds
    #[arg(short, long, default_value = "15000")]
    timeout_ms: u64,

    /// Maximum sessions handled at once
    #[arg(short, long, default_value = "64")]
    max_sessions: usize,

    /// Accepted connections allowed to wait for a free session worker
    #[arg(short, long, default_value = "2")]
    pending: usize,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,shiftwire=info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(true)
        .init();

    let args = Args::parse();

    tracing::info!("shiftwire server v{}", shiftwire::VERSION);

    let config = Config::builder()
        .port(args.port)
        .io_timeout_ms(args.timeout_ms)
        .max_sessions(args.max_sessions)
        .pending_sessions(args.pending)
        .build();

    let server = match ConnectionServer::bind(config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    // Runs until accept fails; otherwise the process is stopped by a signal.
    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
