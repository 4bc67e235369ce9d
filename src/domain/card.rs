//! Candidate Cards
//!
//! The per-mint JSON document the feed persists and the read API serves,
//! plus the "blocked" record served when no card is available.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::pair::{CanonicalPair, VenueKind};
use super::score::Score;

/// Decimals assumed for SPL meme tokens
pub const DEFAULT_DECIMALS: u8 = 9;

const POSITION_PCT: f64 = 0.0075;
const MAX_SLIPPAGE_PCT: f64 = 1.2;
const EXPECTED_IMPACT_PCT: f64 = 1.3;
const ROUTER: &str = "Axiom-or-Jupiter";

const TP_LEVELS_PCT: [u32; 3] = [50, 100, 200];
const TP_ALLOCS_PCT: [u32; 3] = [25, 50, 25];
const INVALIDATION_PCT: f64 = -30.0;

/// Below this liquidity the card carries a `thin_liquidity` flag
const THIN_LIQUIDITY_USD: f64 = 10_000.0;
/// Below this 24h volume the card carries a `low_volume_24h` flag
const LOW_VOLUME_USD: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardToken {
    pub symbol: String,
    pub mint: String,
    pub decimals: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardScore {
    pub total: u32,
}

/// Sizing guidance shared by every route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradePlan {
    pub position_pct: f64,
    pub max_slippage_pct: f64,
    pub expected_impact_pct: f64,
    pub router: String,
}

/// Execution guidance for one routing venue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteGuidance {
    pub venue: String,
    pub max_slippage_pct: f64,
    /// 1 = preferred
    pub priority: u8,
}

/// Take-profit ladder and invalidation level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitPlan {
    pub tp_levels_pct: Vec<u32>,
    pub tp_allocs_pct: Vec<u32>,
    /// Drawdown from entry (percent, negative) that voids the thesis
    pub invalidation_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpsChecklist {
    pub pre_trade_checks: Vec<String>,
    pub post_trade: Vec<String>,
}

/// Liquidity as shown on the card: a number, or "N/A" for venues without one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LiquidityRef {
    Usd(f64),
    Unavailable(String),
}

impl From<Option<f64>> for LiquidityRef {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(usd) => LiquidityRef::Usd(usd),
            None => LiquidityRef::Unavailable("N/A".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRefs {
    pub dex: String,
    pub dex_id: String,
    pub liquidity_usd: LiquidityRef,
}

/// Persisted candidate summary for one mint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateCard {
    pub token: CardToken,
    pub why_now: Vec<String>,
    pub score: CardScore,
    pub plan: TradePlan,
    pub routes: Vec<RouteGuidance>,
    pub exits: ExitPlan,
    pub ops: OpsChecklist,
    pub risk_flags: Vec<String>,
    pub refs: CardRefs,
    /// RFC 3339 UTC timestamp of the cycle that wrote the card
    pub asof: String,
}

impl CandidateCard {
    /// Build the card for a scored pair.
    ///
    /// Everything except `asof` is a function of the pair and score.
    pub fn build(pair: &CanonicalPair, score: Score, asof: DateTime<Utc>) -> Self {
        Self {
            token: CardToken {
                symbol: pair.symbol.clone(),
                mint: pair.mint.clone(),
                decimals: DEFAULT_DECIMALS,
            },
            why_now: why_now(pair),
            score: CardScore { total: score.value() },
            plan: TradePlan {
                position_pct: POSITION_PCT,
                max_slippage_pct: MAX_SLIPPAGE_PCT,
                expected_impact_pct: EXPECTED_IMPACT_PCT,
                router: ROUTER.to_string(),
            },
            routes: vec![
                RouteGuidance {
                    venue: "jupiter".to_string(),
                    max_slippage_pct: MAX_SLIPPAGE_PCT,
                    priority: 1,
                },
                RouteGuidance {
                    venue: "axiom".to_string(),
                    max_slippage_pct: MAX_SLIPPAGE_PCT,
                    priority: 2,
                },
            ],
            exits: ExitPlan {
                tp_levels_pct: TP_LEVELS_PCT.to_vec(),
                tp_allocs_pct: TP_ALLOCS_PCT.to_vec(),
                invalidation_pct: INVALIDATION_PCT,
            },
            ops: OpsChecklist {
                pre_trade_checks: vec!["dust_ok".to_string()],
                post_trade: vec!["journal".to_string()],
            },
            risk_flags: risk_flags(pair),
            refs: CardRefs {
                dex: pair.detail_url.clone(),
                dex_id: pair.dex_id.clone(),
                liquidity_usd: pair.liquidity_usd.into(),
            },
            asof: asof.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn mint(&self) -> &str {
        &self.token.mint
    }
}

fn why_now(pair: &CanonicalPair) -> Vec<String> {
    let mut reasons = vec!["route stable".to_string()];
    if pair.net_buys_1h() > 0 {
        reasons.push("net buying 1h".to_string());
    }
    if pair.volume_24h >= 100_000.0 {
        reasons.push("active 24h volume".to_string());
    }
    reasons
}

fn risk_flags(pair: &CanonicalPair) -> Vec<String> {
    let mut flags = Vec::new();
    match pair.liquidity_usd {
        None => flags.push("no_liquidity_figure".to_string()),
        Some(liq) if liq < THIN_LIQUIDITY_USD => flags.push("thin_liquidity".to_string()),
        Some(_) => {}
    }
    if pair.venue == VenueKind::OrderBook {
        flags.push("orderbook_venue".to_string());
    }
    if pair.volume_24h < LOW_VOLUME_USD {
        flags.push("low_volume_24h".to_string());
    }
    if pair.net_buys_1h() < 0 {
        flags.push("net_selling_1h".to_string());
    }
    flags
}

/// Status string carried by block records
pub const BLOCKED_STATUS: &str = "BLOCKED";

/// Reason served when neither a card nor a block record exists
pub const NOT_ENOUGH_DATA: &str = "not_enough_data";

/// Persisted or synthesized "do not trade" record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub status: String,
    pub reasons: Vec<String>,
}

impl BlockRecord {
    pub fn new(reasons: Vec<String>) -> Self {
        Self {
            status: BLOCKED_STATUS.to_string(),
            reasons,
        }
    }

    /// Placeholder for a mint the store knows nothing about
    pub fn insufficient_data() -> Self {
        Self::new(vec![NOT_ENOUGH_DATA.to_string()])
    }
}
