// Lifevault — Application Entry Point
//
// Parses CLI arguments, initializes structured logging (which never emits
// secrets, digests, or decrypted content), and dispatches to the command
// handler.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use lifevault::cli::{execute, Cli};

fn main() {
    // RUST_LOG=lifevault=debug for verbose output; the default level is
    // `info` and carries no sensitive values.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("lifevault=info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = execute(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
