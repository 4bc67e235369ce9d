//! Candidate Store Port
//!
//! Black-box key-value + ordered-set backend. Every write is a
//! last-write-wins overwrite; nothing spans two keys.

use async_trait::async_trait;
use thiserror::Error;

/// Store key layout shared by the feed and the read API
pub mod keys {
    /// Ordered set of mint -> score
    pub const CANDIDATES: &str = "candidates";
    /// Cycle counter, incremented once per completed feed cycle
    pub const SCAN_SEQ: &str = "scan_seq";
    /// Epoch milliseconds of the last completed feed cycle
    pub const LAST_UPDATE_MS: &str = "last_update_ms";

    pub fn card(mint: &str) -> String {
        format!("card:{}", mint)
    }

    pub fn block(mint: &str) -> String {
        format!("block:{}", mint)
    }
}

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store connection error: {0}")]
    Connection(String),

    #[error("Store command failed: {0}")]
    Command(String),

    #[error("Unexpected value at {key}: {detail}")]
    Value { key: String, detail: String },
}

/// Key-value + ordered-set store
#[async_trait]
pub trait CandidateStore: Send + Sync {
    /// SET key value
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// GET key
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// ZADD set score member (overwrites the member's previous score)
    async fn rank_upsert(&self, set: &str, member: &str, score: f64) -> Result<(), StoreError>;

    /// ZREVRANGE set 0 n-1: the `n` highest-scored members, best first
    async fn rank_top(&self, set: &str, n: usize) -> Result<Vec<String>, StoreError>;

    /// INCR key, returning the new value
    async fn incr(&self, key: &str) -> Result<i64, StoreError>;
}
