//! shiftwire Client Binary
//!
//! Sends one lowercase text, enciphered with the given key, and prints
//! the server's decoded reply.

use std::time::Duration;

use clap::{CommandFactory, Parser};
use shiftwire::{network, ErrorClass};
use tracing_subscriber::{fmt, EnvFilter};

/// shiftwire Client
#[derive(Parser, Debug)]
#[command(name = "shiftwire-client")]
#[command(about = "Sends Caesar-shifted text to a shiftwire server")]
#[command(after_help = "Only lowercase strings with no spaces are accepted as text.\n\
                        Example: shiftwire-client 127.0.0.1 5000 lorenipsumdolur 4")]
#[command(version)]
struct Args {
    /// Server IPv4 or IPv6 address
    address: String,

    /// Server port
    port: String,

    /// Lowercase text with no spaces
    text: String,

    /// Cipher key (non-negative integer)
    key: String,

    /// Timeout for connecting and for each field exchanged, in milliseconds
    #[arg(short, long, default_value = "15000")]
    timeout_ms: u64,
}

fn main() {
    // stdout is reserved for the reply
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,shiftwire=warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();
    let timeout = Duration::from_millis(args.timeout_ms.max(1));

    match network::exchange(&args.address, &args.port, &args.text, &args.key, timeout) {
        Ok(reply) => println!("{}", reply),
        Err(e) => {
            tracing::error!("{} error: {}", e.class(), e);
            if e.class() == ErrorClass::Input {
                let _ = Args::command().print_help();
            }
            std::process::exit(1);
        }
    }
}
