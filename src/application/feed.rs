//! Feed Loop
//!
//! Periodic fetch -> normalize -> gate -> score -> store pipeline.
//! One cycle runs to completion before the loop sleeps; cycles never
//! overlap. Upstream failures produce an empty cycle, never an error.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Notify, RwLock};

use crate::domain::{
    normalize_batch, score_pair, ActivityGate, BlockRecord, CandidateCard, CanonicalPair,
    RawPairRecord, Score,
};
use crate::ports::market_data::PairSource;
use crate::ports::store::CandidateStore;

use super::writer::CandidateWriter;

/// Reason recorded on block records written for blocklisted mints
pub const BLOCKLISTED_REASON: &str = "blocklisted";

/// Feed loop settings
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Sleep between the end of one cycle and the start of the next
    pub interval: Duration,
    /// Candidates written per cycle, best scores first
    pub write_limit: usize,
    pub gate: ActivityGate,
    /// Mints that get a block record instead of a card
    pub blocked_mints: HashSet<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            write_limit: 60,
            gate: ActivityGate::default(),
            blocked_mints: HashSet::new(),
        }
    }
}

/// Loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    /// Waiting for the next tick
    Idle,
    /// A cycle is in progress
    Running,
}

/// Output of the pure selection step
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Scored candidates, best first, at most `write_limit`
    pub candidates: Vec<(CanonicalPair, Score)>,
    /// Blocklisted pairs seen this batch
    pub blocked: Vec<CanonicalPair>,
    /// Pairs that failed the activity gate
    pub gated_out: usize,
}

/// Pick and rank the candidates of one fetch batch.
///
/// Deterministic: the same batch always yields the same selection.
pub fn select_candidates(raw: &[RawPairRecord], config: &FeedConfig) -> Selection {
    let mut selection = Selection::default();

    for pair in normalize_batch(raw) {
        if config.blocked_mints.contains(&pair.mint) {
            selection.blocked.push(pair);
            continue;
        }
        if !config.gate.admits(&pair) {
            selection.gated_out += 1;
            continue;
        }
        let score = score_pair(&pair);
        selection.candidates.push((pair, score));
    }

    // stable: equal scores keep upstream order
    selection.candidates.sort_by(|a, b| b.1.cmp(&a.1));
    selection.candidates.truncate(config.write_limit);
    selection
}

/// Summary of one cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    /// Raw records returned by the upstream
    pub fetched: usize,
    /// Candidates selected for writing
    pub selected: usize,
    pub written: usize,
    pub blocked: usize,
    pub gated_out: usize,
    /// Per-candidate writes that failed
    pub failed: usize,
    /// Cycle counter after stamping; `None` if the stamp failed
    pub seq: Option<i64>,
    /// Set when the fetch failed and the cycle ran empty
    pub fetch_error: Option<String>,
}

/// Periodic scanner feeding the candidate store
pub struct FeedLoop {
    config: FeedConfig,
    source: Arc<dyn PairSource>,
    writer: CandidateWriter,
    state: Arc<RwLock<FeedState>>,
    is_running: Arc<RwLock<bool>>,
    shutdown: Arc<Notify>,
}

impl FeedLoop {
    pub fn new(config: FeedConfig, source: Arc<dyn PairSource>, store: Arc<dyn CandidateStore>) -> Self {
        Self {
            config,
            source,
            writer: CandidateWriter::new(store),
            state: Arc::new(RwLock::new(FeedState::Idle)),
            is_running: Arc::new(RwLock::new(false)),
            shutdown: Arc::new(Notify::new()),
        }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub async fn state(&self) -> FeedState {
        *self.state.read().await
    }

    /// Run cycles until [`stop`](Self::stop) is called
    pub async fn run(&self) {
        *self.is_running.write().await = true;

        tracing::info!(
            "Starting feed loop - interval: {:?}, write limit: {}",
            self.config.interval,
            self.config.write_limit
        );

        while *self.is_running.read().await {
            self.run_cycle().await;

            tokio::select! {
                _ = tokio::time::sleep(self.config.interval) => {}
                _ = self.shutdown.notified() => {}
            }
        }

        tracing::info!("Feed loop stopped");
    }

    /// Stop the loop after the current cycle
    pub async fn stop(&self) {
        *self.is_running.write().await = false;
        self.shutdown.notify_one();
        tracing::info!("Stop signal sent to feed loop");
    }

    /// Run one cycle stamped with the current time
    pub async fn run_cycle(&self) -> CycleReport {
        self.run_cycle_at(Utc::now()).await
    }

    /// Run one cycle stamped with `now`
    pub async fn run_cycle_at(&self, now: DateTime<Utc>) -> CycleReport {
        *self.state.write().await = FeedState::Running;
        let report = self.cycle(now).await;
        *self.state.write().await = FeedState::Idle;

        tracing::info!(
            "cycle seq={:?} fetched={} selected={} wrote={} blocked={} gated_out={} failed={}",
            report.seq,
            report.fetched,
            report.selected,
            report.written,
            report.blocked,
            report.gated_out,
            report.failed
        );
        report
    }

    async fn cycle(&self, now: DateTime<Utc>) -> CycleReport {
        let mut report = CycleReport::default();

        let raw = match self.source.search_pairs().await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Pair fetch failed, cycle runs empty: {}", e);
                report.fetch_error = Some(e.to_string());
                Vec::new()
            }
        };
        report.fetched = raw.len();

        let selection = select_candidates(&raw, &self.config);
        report.selected = selection.candidates.len();
        report.gated_out = selection.gated_out;

        for pair in &selection.blocked {
            let record = BlockRecord::new(vec![BLOCKLISTED_REASON.to_string()]);
            match self.writer.write_block(&pair.mint, &record).await {
                Ok(()) => report.blocked += 1,
                Err(e) => {
                    tracing::warn!("Block record write failed for {}: {}", pair.mint, e);
                    report.failed += 1;
                }
            }
        }

        for (pair, score) in &selection.candidates {
            let card = CandidateCard::build(pair, *score, now);
            match self.writer.write_candidate(&card, *score).await {
                Ok(()) => {
                    tracing::debug!("{} ({}) score={} dex={}", pair.symbol, pair.mint, score, pair.dex_id);
                    report.written += 1;
                }
                Err(e) => {
                    tracing::warn!("Candidate write failed for {}: {}", pair.mint, e);
                    report.failed += 1;
                }
            }
        }

        match self.writer.stamp_cycle(now.timestamp_millis()).await {
            Ok(seq) => report.seq = Some(seq),
            Err(e) => tracing::error!("Freshness stamp failed: {}", e),
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::MemoryStore;
    use crate::domain::pair::fixtures::raw_pair;
    use crate::ports::mocks::MockPairSource;
    use crate::ports::store::CandidateStore;
    use chrono::TimeZone;

    const SOL: (&str, &str) = ("So11111111111111111111111111111111111111112", "SOL");

    fn batch() -> Vec<RawPairRecord> {
        vec![
            raw_pair(("Low", "LOW"), SOL, "orca", Some(5.0), 10.0, 0, 3),
            raw_pair(SOL, ("High", "HIGH"), "raydium", Some(80_000.0), 500_000.0, 40, 5),
            raw_pair(("Book", "BOOK"), SOL, "phoenix", None, 20_000.0, 1, 0),
            raw_pair(("Mid", "MID"), SOL, "meteora", Some(9.0), 30.0, 2, 2),
        ]
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_select_ranks_and_gates() {
        let selection = select_candidates(&batch(), &FeedConfig::default());

        let mints: Vec<&str> = selection.candidates.iter().map(|(p, _)| p.mint.as_str()).collect();
        assert_eq!(mints, vec!["High", "Mid", "Low"]);
        // quiet order book
        assert_eq!(selection.gated_out, 1);
        assert!(selection.blocked.is_empty());
    }

    #[test]
    fn test_select_respects_write_limit() {
        let config = FeedConfig {
            write_limit: 2,
            ..FeedConfig::default()
        };
        let selection = select_candidates(&batch(), &config);
        assert_eq!(selection.candidates.len(), 2);
        assert_eq!(selection.candidates[0].0.mint, "High");
    }

    #[test]
    fn test_select_diverts_blocklisted() {
        let config = FeedConfig {
            blocked_mints: ["High".to_string()].into_iter().collect(),
            ..FeedConfig::default()
        };
        let selection = select_candidates(&batch(), &config);
        assert_eq!(selection.blocked.len(), 1);
        assert!(selection.candidates.iter().all(|(p, _)| p.mint != "High"));
    }

    #[test]
    fn test_select_tolerates_extreme_trade_counts() {
        let raw = vec![
            raw_pair(("Whale", "WHL"), SOL, "raydium", Some(5_000.0), 1_000.0, i64::MAX, -1),
            raw_pair(("Flood", "FLD"), SOL, "phoenix", None, 1_000.0, i64::MAX, i64::MAX),
        ];
        let selection = select_candidates(&raw, &FeedConfig::default());

        assert_eq!(selection.candidates.len(), 2);
        assert_eq!(selection.gated_out, 0);
        let whale = selection.candidates.iter().find(|(p, _)| p.mint == "Whale").unwrap();
        assert_eq!(whale.1.value(), 100);
    }

    #[tokio::test]
    async fn test_cycle_writes_cards_ranks_and_markers() {
        let store = MemoryStore::new();
        let source = MockPairSource::new().with_search(batch());
        let feed = FeedLoop::new(FeedConfig::default(), Arc::new(source), Arc::new(store.clone()));

        let report = feed.run_cycle_at(fixed_time()).await;

        assert_eq!(report.fetched, 4);
        assert_eq!(report.written, 3);
        assert_eq!(report.failed, 0);
        assert_eq!(report.seq, Some(1));
        assert!(report.fetch_error.is_none());

        assert_eq!(store.rank_top("candidates", 10).await.unwrap(), vec!["High", "Mid", "Low"]);
        assert!(store.get("card:High").await.unwrap().is_some());
        assert!(store.get("card:Book").await.unwrap().is_none());
        assert_eq!(
            store.get("last_update_ms").await.unwrap(),
            Some(fixed_time().timestamp_millis().to_string())
        );
        assert_eq!(feed.state().await, FeedState::Idle);
    }

    #[tokio::test]
    async fn test_cycle_is_idempotent() {
        let store = MemoryStore::new();
        let source = MockPairSource::new().with_search(batch());
        let feed = FeedLoop::new(FeedConfig::default(), Arc::new(source), Arc::new(store.clone()));

        feed.run_cycle_at(fixed_time()).await;
        let first_card = store.get("card:High").await.unwrap();
        let first_rank = store.rank_score("candidates", "High").await;

        let report = feed.run_cycle_at(fixed_time()).await;
        assert_eq!(report.seq, Some(2));
        assert_eq!(store.get("card:High").await.unwrap(), first_card);
        assert_eq!(store.rank_score("candidates", "High").await, first_rank);
    }

    #[tokio::test]
    async fn test_fetch_failure_runs_empty_cycle() {
        let store = MemoryStore::new();
        let source = MockPairSource::new();
        let feed = FeedLoop::new(FeedConfig::default(), Arc::new(source), Arc::new(store.clone()));

        let report = feed.run_cycle_at(fixed_time()).await;

        assert!(report.fetch_error.is_some());
        assert_eq!(report.written, 0);
        assert_eq!(report.seq, Some(1));
        assert!(store.rank_top("candidates", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_is_not_fatal() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        let source = MockPairSource::new().with_search(batch());
        let feed = FeedLoop::new(FeedConfig::default(), Arc::new(source), Arc::new(store.clone()));

        let report = feed.run_cycle_at(fixed_time()).await;
        assert_eq!(report.written, 0);
        assert_eq!(report.failed, 3);
        assert_eq!(report.seq, None);
    }

    #[tokio::test]
    async fn test_blocklisted_mint_gets_block_record() {
        let store = MemoryStore::new();
        let source = MockPairSource::new().with_search(batch());
        let config = FeedConfig {
            blocked_mints: ["High".to_string()].into_iter().collect(),
            ..FeedConfig::default()
        };
        let feed = FeedLoop::new(config, Arc::new(source), Arc::new(store.clone()));

        let report = feed.run_cycle_at(fixed_time()).await;
        assert_eq!(report.blocked, 1);
        assert!(store.get("card:High").await.unwrap().is_none());
        assert!(store.get("block:High").await.unwrap().is_some());
        assert_eq!(store.rank_score("candidates", "High").await, None);
    }

    #[tokio::test]
    async fn test_run_stops_on_signal() {
        let store = MemoryStore::new();
        let source = MockPairSource::new().with_search(batch());
        let config = FeedConfig {
            interval: Duration::from_secs(3600),
            ..FeedConfig::default()
        };
        let feed = Arc::new(FeedLoop::new(config, Arc::new(source), Arc::new(store.clone())));

        let runner = {
            let feed = feed.clone();
            tokio::spawn(async move { feed.run().await })
        };

        // wait for the first cycle to be stamped
        for _ in 0..100 {
            if store.get("scan_seq").await.unwrap().is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        feed.stop().await;

        tokio::time::timeout(Duration::from_secs(5), runner)
            .await
            .expect("feed loop did not stop")
            .unwrap();
        assert_eq!(store.get("scan_seq").await.unwrap(), Some("1".to_string()));
    }
}
