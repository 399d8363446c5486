//! Port Tracker - container tracking for a port terminal
//!
//! A CLI tool that validates ISO 6346 container identifiers and tracks
//! operations, tariffs and billing for containers moving through a terminal.

use clap::Parser;
use port_tracker::cli::Cli;
use port_tracker::commands;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "port_tracker=debug,info"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = commands::execute(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
