//! Configuration Loader
//!
//! Builds the process configuration once at startup:
//! 1. Defaults (or an optional TOML file with any subset of sections)
//! 2. Environment overrides (`.env` is loaded by `main`)
//! 3. Validation; a missing store URL is fatal

use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::adapters::dexscreener::{DexScreenerConfig, DEFAULT_BASE_URL};
use crate::application::feed::FeedConfig;
use crate::application::query::{EvaluateMode, QueryConfig};
use crate::domain::ActivityGate;

pub const ENV_REDIS_URL: &str = "UPSTASH_REDIS_URL";
pub const ENV_HELIUS_API_KEY: &str = "HELIUS_API_KEY";
pub const ENV_DEXSCREENER_BASE_URL: &str = "DEXSCREENER_BASE_URL";
pub const ENV_FEED_INTERVAL_SECS: &str = "FEED_INTERVAL_SECS";
pub const ENV_BIND_ADDR: &str = "SCAN_BIND_ADDR";
pub const ENV_EVALUATE_MODE: &str = "EVALUATE_MODE";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub upstream: UpstreamSection,
    pub store: StoreSection,
    pub feed: FeedSection,
    pub query: QuerySection,
    pub server: ServerSection,
    pub credentials: CredentialsSection,
    pub logging: LoggingSection,
}

/// DexScreener section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamSection {
    /// API root
    pub base_url: String,
    /// Search query for the scan cycle
    pub search_query: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for UpstreamSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            search_query: "solana".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Candidate store section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// Redis URL; normally supplied through UPSTASH_REDIS_URL
    pub url: String,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            url: String::new(),
            connect_timeout_secs: 10,
        }
    }
}

/// Feed loop section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedSection {
    /// Seconds to sleep after a cycle finishes before the next one starts
    pub interval_secs: u64,
    /// Candidates kept per cycle
    pub write_limit: usize,
    /// Minimum AMM pool liquidity (USD)
    pub min_tvl_usd_amm: f64,
    /// Minimum 1h trade count for order books
    pub min_txns_h1_orderbook: i64,
    /// Mints that get a block record instead of a card
    pub blocked_mints: Vec<String>,
}

impl Default for FeedSection {
    fn default() -> Self {
        let feed = FeedConfig::default();
        Self {
            interval_secs: feed.interval.as_secs(),
            write_limit: feed.write_limit,
            min_tvl_usd_amm: feed.gate.min_tvl_usd_amm,
            min_txns_h1_orderbook: feed.gate.min_txns_h1_orderbook,
            blocked_mints: Vec::new(),
        }
    }
}

/// Read API section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuerySection {
    pub default_scan_limit: usize,
    pub max_scan_limit: usize,
    /// Mints starting with this prefix are test data and never served
    pub synthetic_prefix: String,
    /// "cached" or "live"
    pub evaluate_mode: EvaluateMode,
}

impl Default for QuerySection {
    fn default() -> Self {
        let query = QueryConfig::default();
        Self {
            default_scan_limit: query.default_scan_limit,
            max_scan_limit: query.max_scan_limit,
            synthetic_prefix: query.synthetic_prefix,
            evaluate_mode: query.evaluate_mode,
        }
    }
}

/// HTTP server section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
        }
    }
}

/// External credentials; only their presence is ever reported
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CredentialsSection {
    pub helius_api_key: Option<String>,
}

/// Logging section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Missing required setting: {0}")]
    Missing(&'static str),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from an optional TOML file plus the process environment
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => Config::default(),
    };
    config.apply_overrides(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

fn parse_env<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::ValidationError(format!("{} has invalid value '{}'", key, raw)))
}

impl Config {
    /// Apply environment overrides through `lookup` (empty values are ignored)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_REDIS_URL) {
            self.store.url = url;
        }
        if let Some(key) = get(ENV_HELIUS_API_KEY) {
            self.credentials.helius_api_key = Some(key);
        }
        if let Some(url) = get(ENV_DEXSCREENER_BASE_URL) {
            self.upstream.base_url = url;
        }
        if let Some(raw) = get(ENV_FEED_INTERVAL_SECS) {
            self.feed.interval_secs = parse_env(ENV_FEED_INTERVAL_SECS, &raw)?;
        }
        if let Some(bind) = get(ENV_BIND_ADDR) {
            self.server.bind = bind;
        }
        if let Some(raw) = get(ENV_EVALUATE_MODE) {
            self.query.evaluate_mode = parse_env(ENV_EVALUATE_MODE, &raw)?;
        }
        Ok(())
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.url.trim().is_empty() {
            return Err(ConfigError::Missing(ENV_REDIS_URL));
        }

        if self.upstream.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "upstream.base_url cannot be empty".to_string(),
            ));
        }

        if self.upstream.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "upstream.timeout_secs must be > 0".to_string(),
            ));
        }

        if self.store.connect_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "store.connect_timeout_secs must be > 0".to_string(),
            ));
        }

        if self.feed.interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "feed.interval_secs must be > 0".to_string(),
            ));
        }

        if self.feed.write_limit == 0 {
            return Err(ConfigError::ValidationError(
                "feed.write_limit must be > 0".to_string(),
            ));
        }

        if self.feed.min_tvl_usd_amm < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "feed.min_tvl_usd_amm must be >= 0, got {}",
                self.feed.min_tvl_usd_amm
            )));
        }

        if self.feed.min_txns_h1_orderbook < 0 {
            return Err(ConfigError::ValidationError(format!(
                "feed.min_txns_h1_orderbook must be >= 0, got {}",
                self.feed.min_txns_h1_orderbook
            )));
        }

        if self.query.max_scan_limit == 0 {
            return Err(ConfigError::ValidationError(
                "query.max_scan_limit must be > 0".to_string(),
            ));
        }

        if self.query.default_scan_limit > self.query.max_scan_limit {
            return Err(ConfigError::ValidationError(format!(
                "query.default_scan_limit ({}) exceeds query.max_scan_limit ({})",
                self.query.default_scan_limit, self.query.max_scan_limit
            )));
        }

        Ok(())
    }

    /// Whether the Helius key is configured
    pub fn has_helius_key(&self) -> bool {
        self.credentials
            .helius_api_key
            .as_deref()
            .map(|k| !k.is_empty())
            .unwrap_or(false)
    }
}

impl From<&Config> for DexScreenerConfig {
    fn from(config: &Config) -> Self {
        DexScreenerConfig {
            base_url: config.upstream.base_url.clone(),
            search_query: config.upstream.search_query.clone(),
            timeout_secs: config.upstream.timeout_secs,
            ..DexScreenerConfig::default()
        }
    }
}

impl From<&Config> for FeedConfig {
    fn from(config: &Config) -> Self {
        FeedConfig {
            interval: std::time::Duration::from_secs(config.feed.interval_secs),
            write_limit: config.feed.write_limit,
            gate: ActivityGate {
                min_tvl_usd_amm: config.feed.min_tvl_usd_amm,
                min_txns_h1_orderbook: config.feed.min_txns_h1_orderbook,
            },
            blocked_mints: config.feed.blocked_mints.iter().cloned().collect(),
        }
    }
}

impl From<&Config> for QueryConfig {
    fn from(config: &Config) -> Self {
        QueryConfig {
            default_scan_limit: config.query.default_scan_limit,
            max_scan_limit: config.query.max_scan_limit,
            synthetic_prefix: config.query.synthetic_prefix.clone(),
            evaluate_mode: config.query.evaluate_mode,
            gate: ActivityGate {
                min_tvl_usd_amm: config.feed.min_tvl_usd_amm,
                min_txns_h1_orderbook: config.feed.min_txns_h1_orderbook,
            },
            helius_configured: config.has_helius_key(),
            store_configured: !config.store.url.trim().is_empty(),
        }
    }
}
