//! Candidate Store Writer
//!
//! Owns every write the feed makes. Card and rank are two independent
//! writes; readers must tolerate seeing one without the other.

use std::sync::Arc;

use crate::domain::{BlockRecord, CandidateCard, Score};
use crate::ports::store::{keys, CandidateStore, StoreError};

#[derive(Clone)]
pub struct CandidateWriter {
    store: Arc<dyn CandidateStore>,
}

impl CandidateWriter {
    pub fn new(store: Arc<dyn CandidateStore>) -> Self {
        Self { store }
    }

    /// Overwrite the mint's card, then its rank
    pub async fn write_candidate(&self, card: &CandidateCard, score: Score) -> Result<(), StoreError> {
        let body = serde_json::to_string(card).map_err(|e| StoreError::Value {
            key: keys::card(card.mint()),
            detail: e.to_string(),
        })?;

        self.store.set(&keys::card(card.mint()), &body).await?;
        self.store
            .rank_upsert(keys::CANDIDATES, card.mint(), score.value() as f64)
            .await
    }

    /// Overwrite the mint's block record
    pub async fn write_block(&self, mint: &str, record: &BlockRecord) -> Result<(), StoreError> {
        let body = serde_json::to_string(record).map_err(|e| StoreError::Value {
            key: keys::block(mint),
            detail: e.to_string(),
        })?;
        self.store.set(&keys::block(mint), &body).await
    }

    /// Mark a cycle complete: last-write timestamp, then the counter.
    ///
    /// Returns the new cycle counter.
    pub async fn stamp_cycle(&self, now_ms: i64) -> Result<i64, StoreError> {
        self.store
            .set(keys::LAST_UPDATE_MS, &now_ms.to_string())
            .await?;
        self.store.incr(keys::SCAN_SEQ).await
    }
}
