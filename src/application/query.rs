//! Query Service
//!
//! Read side of the candidate store. Never writes, never coordinates with
//! the feed: a card may be present while its rank is stale, or the other
//! way round, and that is served as-is.

use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    normalize_pair, score_pair, ActivityGate, BlockRecord, CandidateCard, CanonicalPair, Score,
};
use crate::ports::market_data::PairSource;
use crate::ports::store::{keys, CandidateStore};

/// Which contract `/evaluate` serves. A deployment picks exactly one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluateMode {
    /// Persisted card, else persisted block record, else "not enough data"
    #[default]
    Cached,
    /// Ignore the store; score the mint's best upstream pair now
    Live,
}

impl FromStr for EvaluateMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cached" | "cache" => Ok(EvaluateMode::Cached),
            "live" => Ok(EvaluateMode::Live),
            other => Err(format!("unknown evaluate mode '{}'", other)),
        }
    }
}

/// Query service settings
#[derive(Debug, Clone)]
pub struct QueryConfig {
    pub default_scan_limit: usize,
    pub max_scan_limit: usize,
    /// Mints with this prefix are leftover test data
    pub synthetic_prefix: String,
    pub evaluate_mode: EvaluateMode,
    /// Gate applied to live evaluation; same thresholds as the feed
    pub gate: ActivityGate,
    pub helius_configured: bool,
    pub store_configured: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_scan_limit: 10,
            max_scan_limit: 200,
            synthetic_prefix: "DUMMY".to_string(),
            evaluate_mode: EvaluateMode::Cached,
            gate: ActivityGate::default(),
            helius_configured: false,
            store_configured: false,
        }
    }
}

/// Which credentials are configured; values are never exposed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialFlags {
    #[serde(rename = "HELIUS_API_KEY")]
    pub helius_api_key: bool,
    #[serde(rename = "UPSTASH_REDIS_URL")]
    pub upstash_redis_url: bool,
}

/// Health and freshness snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub env: CredentialFlags,
    /// Completed feed cycles; 0 means the feed never ran
    pub scan_seq: i64,
    /// Epoch ms of the last completed cycle; 0 means never
    pub last_update_ms: i64,
}

/// Result of evaluating one mint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Evaluation {
    Card(Box<CandidateCard>),
    Blocked(BlockRecord),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvaluateError {
    /// Live mode only: the upstream has no qualifying Solana pair
    #[error("No qualifying Solana pair for {mint}")]
    NotFound { mint: String },
}

/// Read-only view over the candidate store
#[derive(Clone)]
pub struct QueryService {
    config: QueryConfig,
    store: Arc<dyn CandidateStore>,
    source: Arc<dyn PairSource>,
}

impl QueryService {
    pub fn new(config: QueryConfig, store: Arc<dyn CandidateStore>, source: Arc<dyn PairSource>) -> Self {
        Self { config, store, source }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Credentials flags plus freshness markers (0 when absent or unreadable)
    pub async fn health(&self) -> HealthReport {
        HealthReport {
            env: CredentialFlags {
                helius_api_key: self.config.helius_configured,
                upstash_redis_url: self.config.store_configured,
            },
            scan_seq: self.read_counter(keys::SCAN_SEQ).await,
            last_update_ms: self.read_counter(keys::LAST_UPDATE_MS).await,
        }
    }

    async fn read_counter(&self, key: &str) -> i64 {
        match self.store.get(key).await {
            Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!("Ignoring non-integer value at {}: {:?}", key, raw);
                0
            }),
            Ok(None) => 0,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", key, e);
                0
            }
        }
    }

    /// Effective scan size for a caller-supplied limit
    pub fn scan_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.config.default_scan_limit)
            .min(self.config.max_scan_limit)
    }

    /// Top-ranked cards, best first, at most `limit` (after capping).
    ///
    /// Synthetic mints and missing or unparseable cards are skipped, so the
    /// result may be shorter than the limit.
    pub async fn scan(&self, requested: Option<usize>) -> Vec<CandidateCard> {
        let limit = self.scan_limit(requested);

        let mints = match self.store.rank_top(keys::CANDIDATES, limit).await {
            Ok(mints) => mints,
            Err(e) => {
                tracing::warn!("Rank read failed, serving empty scan: {}", e);
                return Vec::new();
            }
        };

        let mut cards = Vec::with_capacity(mints.len());
        for mint in mints.iter().take(limit) {
            if self.is_synthetic(mint) {
                continue;
            }
            if let Some(card) = self.load_json::<CandidateCard>(&keys::card(mint)).await {
                cards.push(card);
            }
        }
        cards
    }

    fn is_synthetic(&self, mint: &str) -> bool {
        !self.config.synthetic_prefix.is_empty() && mint.starts_with(&self.config.synthetic_prefix)
    }

    /// Read and parse a JSON value; any failure reads as absent
    async fn load_json<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", key, e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!("Skipping unparseable {}: {}", key, e);
                None
            }
        }
    }

    /// Evaluate one mint under the configured contract
    pub async fn evaluate(&self, mint: &str) -> Result<Evaluation, EvaluateError> {
        match self.config.evaluate_mode {
            EvaluateMode::Cached => Ok(self.evaluate_cached(mint).await),
            EvaluateMode::Live => self.evaluate_live(mint).await,
        }
    }

    async fn evaluate_cached(&self, mint: &str) -> Evaluation {
        if let Some(card) = self.load_json::<CandidateCard>(&keys::card(mint)).await {
            return Evaluation::Card(Box::new(card));
        }
        if let Some(block) = self.load_json::<BlockRecord>(&keys::block(mint)).await {
            return Evaluation::Blocked(block);
        }
        Evaluation::Blocked(BlockRecord::insufficient_data())
    }

    async fn evaluate_live(&self, mint: &str) -> Result<Evaluation, EvaluateError> {
        let not_found = || EvaluateError::NotFound { mint: mint.to_string() };

        let raw = self.source.token_pairs(mint).await.map_err(|e| {
            tracing::warn!("Live lookup for {} failed: {}", mint, e);
            not_found()
        })?;

        let (pair, score) = best_pair(
            raw.iter()
                .filter_map(normalize_pair)
                .filter(|p| p.mint == mint && self.config.gate.admits(p)),
        )
        .ok_or_else(not_found)?;

        Ok(Evaluation::Card(Box::new(CandidateCard::build(&pair, score, Utc::now()))))
    }
}

/// Highest-scoring pair; the earliest one wins ties
fn best_pair(pairs: impl Iterator<Item = CanonicalPair>) -> Option<(CanonicalPair, Score)> {
    pairs.fold(None, |best, pair| {
        let score = score_pair(&pair);
        match best {
            Some((_, best_score)) if best_score >= score => best,
            _ => Some((pair, score)),
        }
    })
}
