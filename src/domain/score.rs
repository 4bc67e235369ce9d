//! Tradeability Scorer
//!
//! score = clamp(40·log10(liq) + 40·log10(vol) + 20·clamp(net, ±50)/50)
//!
//! Liquidity and volume are floored at 1 before the log so empty pools
//! contribute zero. Pure function; identical for every venue type.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::pair::CanonicalPair;

/// Lowest score a scored pair can receive
pub const MIN_SCORE: u32 = 1;
/// Highest score a scored pair can receive
pub const MAX_SCORE: u32 = 100;

const LIQUIDITY_WEIGHT: f64 = 40.0;
const VOLUME_WEIGHT: f64 = 40.0;
const NET_BUY_WEIGHT: f64 = 20.0;
const NET_BUY_CAP: i64 = 50;

/// Bounded integer tradeability score in `[MIN_SCORE, MAX_SCORE]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Score(u32);

impl Score {
    /// Clamp an arbitrary raw value into range
    pub fn clamped(raw: f64) -> Self {
        if raw.is_nan() {
            return Score(MIN_SCORE);
        }
        let rounded = raw.round().clamp(MIN_SCORE as f64, MAX_SCORE as f64);
        Score(rounded as u32)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unclamped weighted sum; exposed for diagnostics and tests
pub fn raw_score(liquidity_usd: f64, volume_24h: f64, net_buys_1h: i64) -> f64 {
    let s_liq = liquidity_usd.max(1.0).log10() * LIQUIDITY_WEIGHT;
    let s_vol = volume_24h.max(1.0).log10() * VOLUME_WEIGHT;
    let net = net_buys_1h.clamp(-NET_BUY_CAP, NET_BUY_CAP) as f64;
    let s_net = net / NET_BUY_CAP as f64 * NET_BUY_WEIGHT;
    s_liq + s_vol + s_net
}

/// Score from the three inputs
pub fn score_metrics(liquidity_usd: f64, volume_24h: f64, net_buys_1h: i64) -> Score {
    Score::clamped(raw_score(liquidity_usd, volume_24h, net_buys_1h))
}

/// Score a canonical pair. Missing liquidity scores as zero.
pub fn score_pair(pair: &CanonicalPair) -> Score {
    score_metrics(
        pair.liquidity_usd.unwrap_or(0.0),
        pair.volume_24h,
        pair.net_buys_1h(),
    )
}
