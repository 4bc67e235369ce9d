//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - DexScreener: upstream pair source
//! - Store: Redis and in-memory candidate stores
//! - HTTP: read API routing
//! - CLI: Command-line interface

pub mod cli;
pub mod dexscreener;
pub mod http;
pub mod store;

pub use cli::CliApp;
pub use dexscreener::DexScreenerClient;
pub use store::{MemoryStore, RedisStore};
