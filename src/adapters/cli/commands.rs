//! CLI Commands
//!
//! Argument definitions for the sol-hunter binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// sol-hunter - Solana pair scanner and candidate read API
#[derive(Parser, Debug)]
#[command(
    name = "sol-hunter",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Scores DexScreener Solana pairs and serves ranked candidates",
    long_about = "sol-hunter runs two independent processes sharing one Redis store: \
                  the feed scans DexScreener on a fixed period and writes scored candidate \
                  cards, the read API serves the ranked list and per-mint detail."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Optional TOML file with tunables (secrets stay in the environment)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the scan feed
    Feed(FeedCmd),

    /// Serve the read API
    Serve(ServeCmd),
}

/// Run the scan feed
#[derive(Parser, Debug)]
pub struct FeedCmd {
    /// Run a single cycle and exit (for scheduled jobs)
    #[arg(long)]
    pub once: bool,

    /// Override the cycle interval in seconds
    #[arg(long, value_name = "SECS")]
    pub interval: Option<u64>,
}

/// Serve the read API
#[derive(Parser, Debug)]
pub struct ServeCmd {
    /// Override the bind address (host:port)
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,
}
