//! Inkpress: plugin-driven content runtime.
//!
//! Entry point wiring configuration, logging, the content provider and the
//! first-party plugins into a plugin manager, then running one command.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use inkpress_core::config::AppConfig;

mod commands;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            output::print_error(&format!("Failed to load configuration: {e}"));
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = cli.execute(config).await {
        if e.kind.is_client_error() {
            tracing::warn!(error = %e, status = e.status_code(), "Command rejected");
        } else {
            tracing::error!(error = %e, status = e.status_code(), "Command failed");
        }
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Initialize tracing/logging on stderr, keeping stdout for command output
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
