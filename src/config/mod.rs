//! Configuration Module
//!
//! Loads and validates configuration from defaults, an optional TOML file,
//! and the environment.

pub mod loader;

pub use loader::{load_config, Config, ConfigError};
