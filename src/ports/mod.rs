//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - The upstream pair source (DexScreener)
//! - The candidate store (Redis key-value + sorted set)

pub mod market_data;
pub mod mocks;
pub mod store;

pub use market_data::{MarketDataError, PairSource};
pub use store::{keys, CandidateStore, StoreError};
