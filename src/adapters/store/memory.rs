//! In-Memory Candidate Store
//!
//! Process-local stand-in for Redis with the same ordering rules:
//! - ZREVRANGE ties break by member, descending
//! - INCR on a missing key starts from zero
//!
//! Backs the unit and integration tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::ports::store::{CandidateStore, StoreError};

#[derive(Debug, Default)]
struct Inner {
    values: HashMap<String, String>,
    sorted_sets: HashMap<String, HashMap<String, f64>>,
}

/// Shared in-memory store; clones see the same data
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail until reset
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// DEL key
    pub async fn remove(&self, key: &str) {
        self.inner.write().await.values.remove(key);
    }

    /// ZSCORE set member
    pub async fn rank_score(&self, set: &str, member: &str) -> Option<f64> {
        self.inner
            .read()
            .await
            .sorted_sets
            .get(set)
            .and_then(|s| s.get(member))
            .copied()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Connection("writes disabled".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CandidateStore for MemoryStore {
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        self.inner
            .write()
            .await
            .values
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.inner.read().await.values.get(key).cloned())
    }

    async fn rank_upsert(&self, set: &str, member: &str, score: f64) -> Result<(), StoreError> {
        self.check_writable()?;
        self.inner
            .write()
            .await
            .sorted_sets
            .entry(set.to_string())
            .or_default()
            .insert(member.to_string(), score);
        Ok(())
    }

    async fn rank_top(&self, set: &str, n: usize) -> Result<Vec<String>, StoreError> {
        if n == 0 {
            return Ok(Vec::new());
        }

        let inner = self.inner.read().await;
        let Some(members) = inner.sorted_sets.get(set) else {
            return Ok(Vec::new());
        };

        let mut ranked: Vec<(&String, f64)> = members.iter().map(|(m, s)| (m, *s)).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| b.0.cmp(a.0)));

        Ok(ranked.into_iter().take(n).map(|(m, _)| m.clone()).collect())
    }

    async fn incr(&self, key: &str) -> Result<i64, StoreError> {
        self.check_writable()?;
        let mut inner = self.inner.write().await;
        let current = match inner.values.get(key) {
            Some(raw) => raw.parse::<i64>().map_err(|_| StoreError::Value {
                key: key.to_string(),
                detail: "value is not an integer".to_string(),
            })?,
            None => 0,
        };
        let next = current + 1;
        inner.values.insert(key.to_string(), next.to_string());
        Ok(next)
    }
}
