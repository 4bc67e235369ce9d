//! CLI Adapter
//!
//! Command-line interface for sol-hunter.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{CliApp, Command, FeedCmd, ServeCmd};
