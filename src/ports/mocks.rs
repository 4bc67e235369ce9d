use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use async_trait::async_trait;

use crate::domain::RawPairRecord;
use super::market_data::{MarketDataError, PairSource};

/// Scripted pair source that records calls and returns configured batches
#[derive(Debug, Default, Clone)]
pub struct MockPairSource {
    calls: Arc<Mutex<Vec<String>>>,
    search: Arc<Mutex<Option<Vec<RawPairRecord>>>>,
    by_mint: Arc<Mutex<HashMap<String, Vec<RawPairRecord>>>>,
}

impl MockPairSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the search batch; without one, search fails
    pub fn with_search(self, pairs: Vec<RawPairRecord>) -> Self {
        self.set_search(Some(pairs));
        self
    }

    /// Builder method to set the pairs returned for one mint
    pub fn with_token_pairs(self, mint: &str, pairs: Vec<RawPairRecord>) -> Self {
        self.by_mint.lock().unwrap().insert(mint.to_string(), pairs);
        self
    }

    /// Replace the search batch; `None` makes the next search fail
    pub fn set_search(&self, pairs: Option<Vec<RawPairRecord>>) {
        *self.search.lock().unwrap() = pairs;
    }

    /// Get all recorded calls
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PairSource for MockPairSource {
    async fn search_pairs(&self) -> Result<Vec<RawPairRecord>, MarketDataError> {
        self.calls.lock().unwrap().push("search".to_string());
        self.search
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| MarketDataError::Http("no search response configured".to_string()))
    }

    async fn token_pairs(&self, mint: &str) -> Result<Vec<RawPairRecord>, MarketDataError> {
        self.calls.lock().unwrap().push(format!("token:{}", mint));
        self.by_mint
            .lock()
            .unwrap()
            .get(mint)
            .cloned()
            .ok_or(MarketDataError::Status(404))
    }
}
