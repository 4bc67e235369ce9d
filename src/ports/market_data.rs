//! Market Data Port
//!
//! Source of raw pair records. The feed only needs a batch search; live
//! evaluation needs the pairs for one mint.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::RawPairRecord;

/// Upstream market data errors
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Request timed out after {0} s")]
    Timeout(u64),

    #[error("Upstream returned status {0}")]
    Status(u16),

    #[error("Malformed response: {0}")]
    Parse(String),
}

/// Provider of DexScreener-shaped pair records
#[async_trait]
pub trait PairSource: Send + Sync {
    /// Fetch the current batch of candidate pairs
    async fn search_pairs(&self) -> Result<Vec<RawPairRecord>, MarketDataError>;

    /// Fetch every pair the upstream knows for one mint
    async fn token_pairs(&self, mint: &str) -> Result<Vec<RawPairRecord>, MarketDataError>;
}
