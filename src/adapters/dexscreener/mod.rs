//! DexScreener Adapter
//!
//! Implements [`PairSource`](crate::ports::PairSource) over the public
//! DexScreener HTTP API.

mod client;

pub use client::{DexScreenerClient, DexScreenerConfig, DEFAULT_BASE_URL};
