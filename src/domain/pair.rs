//! Pair Normalization
//!
//! Turns raw DexScreener pair records into canonical candidates:
//! - Flips base/quote so the non-SOL side is the asset of interest
//! - Classifies the venue (AMM pool vs order book)
//! - Applies the per-venue activity gate
//! - Deduplicates a fetch batch by mint (first occurrence wins)

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

/// Chain id the scanner cares about
pub const SOLANA_CHAIN_ID: &str = "solana";

/// Reference currency symbol; never the asset of interest
pub const REFERENCE_SYMBOL: &str = "SOL";

/// Symbol used when the upstream record carries none
pub const UNKNOWN_SYMBOL: &str = "UNK";

/// DexScreener dex ids known to be AMM pools
pub const AMM_DEXES: &[&str] = &[
    "raydium",
    "raydium-clmm",
    "orca",
    "orca-clmm",
    "meteora",
    "pumpfun",
    "saros",
];

/// DexScreener dex ids known to be order books
pub const ORDERBOOK_DEXES: &[&str] = &["phoenix", "openbook", "serum", "goosefx", "jupiter-limit"];

/// Token side of a raw pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawToken {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
}

/// `liquidity` object of a raw pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLiquidity {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub usd: Option<f64>,
}

/// `volume` object of a raw pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawVolume {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub h24: Option<f64>,
}

/// Buy/sell counts for one window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTxnCounts {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub buys: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub sells: Option<i64>,
}

/// `txns` object of a raw pair; only the 1h window is consumed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTxns {
    #[serde(default)]
    pub h1: Option<RawTxnCounts>,
}

/// Pair record as returned by DexScreener.
///
/// Every field is optional: the upstream is best-effort and routinely omits
/// fields. Defaults are resolved in [`normalize_pair`], nowhere else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPairRecord {
    #[serde(default)]
    pub chain_id: Option<String>,
    #[serde(default)]
    pub dex_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub base_token: Option<RawToken>,
    #[serde(default)]
    pub quote_token: Option<RawToken>,
    #[serde(default)]
    pub liquidity: Option<RawLiquidity>,
    #[serde(default)]
    pub volume: Option<RawVolume>,
    #[serde(default)]
    pub txns: Option<RawTxns>,
}

/// Venue type, decides which gate applies before scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VenueKind {
    Amm,
    OrderBook,
}

impl VenueKind {
    /// Classify a venue from its dex id and whether it reported liquidity.
    ///
    /// Unknown dex ids without a liquidity figure are treated as order books.
    pub fn classify(dex_id: &str, has_liquidity: bool) -> Self {
        let is_amm = AMM_DEXES.contains(&dex_id);
        if ORDERBOOK_DEXES.contains(&dex_id) || (!has_liquidity && !is_amm) {
            VenueKind::OrderBook
        } else {
            VenueKind::Amm
        }
    }
}

/// Canonical view of one pair, asset of interest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalPair {
    /// Mint of the asset of interest (never the reference currency)
    pub mint: String,
    pub symbol: String,
    /// Liquidity in USD; `None` when the venue reports no figure
    pub liquidity_usd: Option<f64>,
    pub detail_url: String,
    /// Lowercased DexScreener dex id
    pub dex_id: String,
    pub venue: VenueKind,
    pub volume_24h: f64,
    pub buys_1h: i64,
    pub sells_1h: i64,
}

impl CanonicalPair {
    /// Net buy pressure over the last hour
    pub fn net_buys_1h(&self) -> i64 {
        self.buys_1h.saturating_sub(self.sells_1h)
    }

    /// Total 1h trade count ("tape")
    pub fn txns_1h(&self) -> i64 {
        self.buys_1h.saturating_add(self.sells_1h)
    }
}

/// Activity gate thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivityGate {
    /// Minimum liquidity for AMM pools; pools without a figure never pass
    pub min_tvl_usd_amm: f64,
    /// Minimum 1h trade count for order-book markets
    pub min_txns_h1_orderbook: i64,
}

impl Default for ActivityGate {
    fn default() -> Self {
        Self {
            min_tvl_usd_amm: 0.0,
            min_txns_h1_orderbook: 3,
        }
    }
}

impl ActivityGate {
    /// Whether a pair is active enough to be scored
    pub fn admits(&self, pair: &CanonicalPair) -> bool {
        match pair.venue {
            VenueKind::OrderBook => pair.txns_1h() >= self.min_txns_h1_orderbook,
            VenueKind::Amm => pair
                .liquidity_usd
                .map(|liq| liq >= self.min_tvl_usd_amm)
                .unwrap_or(false),
        }
    }
}

/// Is this record on the Solana chain?
pub fn is_solana(raw: &RawPairRecord) -> bool {
    raw.chain_id.as_deref() == Some(SOLANA_CHAIN_ID)
}

fn upper_symbol(token: &RawToken) -> String {
    token.symbol.as_deref().unwrap_or_default().to_uppercase()
}

/// Normalize a raw pair into its canonical form.
///
/// Returns `None` when the record is off-chain for us or the asset side has
/// no address. Does not apply the activity gate.
pub fn normalize_pair(raw: &RawPairRecord) -> Option<CanonicalPair> {
    if !is_solana(raw) {
        return None;
    }

    let mut base = raw.base_token.clone().unwrap_or_default();
    let mut quote = raw.quote_token.clone().unwrap_or_default();

    if upper_symbol(&base) == REFERENCE_SYMBOL && upper_symbol(&quote) != REFERENCE_SYMBOL {
        std::mem::swap(&mut base, &mut quote);
    }

    let mint = base.address.filter(|a| !a.is_empty())?;
    let symbol = base
        .symbol
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_SYMBOL.to_string());

    // Negative figures are upstream noise; treat them as unreported
    let liquidity_usd = raw
        .liquidity
        .as_ref()
        .and_then(|l| l.usd)
        .filter(|usd| *usd >= 0.0);
    let dex_id = raw.dex_id.as_deref().unwrap_or_default().to_lowercase();
    let venue = VenueKind::classify(&dex_id, liquidity_usd.is_some());

    let h1 = raw
        .txns
        .as_ref()
        .and_then(|t| t.h1.clone())
        .unwrap_or_default();

    Some(CanonicalPair {
        mint,
        symbol,
        liquidity_usd,
        detail_url: raw.url.clone().unwrap_or_default(),
        dex_id,
        venue,
        volume_24h: raw.volume.as_ref().and_then(|v| v.h24).unwrap_or(0.0),
        buys_1h: h1.buys.unwrap_or(0).max(0),
        sells_1h: h1.sells.unwrap_or(0).max(0),
    })
}

/// Normalize a fetch batch, dropping duplicate mints.
///
/// The first record seen for a mint claims it, so a later duplicate is
/// dropped even if the first one fails the activity gate downstream.
pub fn normalize_batch(raw: &[RawPairRecord]) -> Vec<CanonicalPair> {
    let mut seen = HashSet::new();
    raw.iter()
        .filter_map(normalize_pair)
        .filter(|pair| seen.insert(pair.mint.clone()))
        .collect()
}

/// Accept a JSON number, a numeric string, or null
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite()))
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(serde_json::Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Build a raw Solana pair with the given sides and metrics
    pub fn raw_pair(
        base: (&str, &str),
        quote: (&str, &str),
        dex_id: &str,
        liquidity: Option<f64>,
        volume_24h: f64,
        buys: i64,
        sells: i64,
    ) -> RawPairRecord {
        RawPairRecord {
            chain_id: Some(SOLANA_CHAIN_ID.to_string()),
            dex_id: Some(dex_id.to_string()),
            url: Some(format!("https://dexscreener.com/solana/{}", base.0.to_lowercase())),
            base_token: Some(RawToken {
                address: Some(base.0.to_string()),
                symbol: Some(base.1.to_string()),
            }),
            quote_token: Some(RawToken {
                address: Some(quote.0.to_string()),
                symbol: Some(quote.1.to_string()),
            }),
            liquidity: Some(RawLiquidity { usd: liquidity }),
            volume: Some(RawVolume { h24: Some(volume_24h) }),
            txns: Some(RawTxns {
                h1: Some(RawTxnCounts {
                    buys: Some(buys),
                    sells: Some(sells),
                }),
            }),
        }
    }
}
