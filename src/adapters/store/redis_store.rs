//! Redis Candidate Store
//!
//! Async Redis client (Upstash-compatible, `rediss://` supported) backing
//! the candidate store port. Uses a multiplexed `ConnectionManager`, which
//! reconnects on its own; no retries happen here.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisError};

use crate::ports::store::{CandidateStore, StoreError};

/// Redis-backed candidate store
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

fn map_redis(e: RedisError) -> StoreError {
    if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() || e.is_timeout() {
        StoreError::Connection(e.to_string())
    } else {
        StoreError::Command(e.to_string())
    }
}

impl RedisStore {
    /// Connect to Redis at `url`, giving up after `timeout`
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client = redis::Client::open(url).map_err(|e| StoreError::Connection(e.to_string()))?;

        let conn = tokio::time::timeout(timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| {
                StoreError::Connection(format!("connect timed out after {:?}", timeout))
            })?
            .map_err(map_redis)?;

        tracing::info!("Connected to candidate store");
        Ok(Self { conn })
    }
}

#[async_trait]
impl CandidateStore for RedisStore {
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(key, value).await.map_err(map_redis)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        conn.get::<_, Option<String>>(key).await.map_err(map_redis)
    }

    async fn rank_upsert(&self, set: &str, member: &str, score: f64) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.zadd::<_, _, _, ()>(set, member, score)
            .await
            .map_err(map_redis)
    }

    async fn rank_top(&self, set: &str, n: usize) -> Result<Vec<String>, StoreError> {
        if n == 0 {
            // ZREVRANGE 0 -1 would return the whole set
            return Ok(Vec::new());
        }
        let stop = isize::try_from(n - 1).unwrap_or(isize::MAX);
        let mut conn = self.conn.clone();
        conn.zrevrange::<_, Vec<String>>(set, 0, stop)
            .await
            .map_err(map_redis)
    }

    async fn incr(&self, key: &str) -> Result<i64, StoreError> {
        let mut conn = self.conn.clone();
        conn.incr::<_, _, i64>(key, 1).await.map_err(map_redis)
    }
}
