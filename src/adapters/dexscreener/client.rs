//! DexScreener API Client
//!
//! HTTP client for the public DexScreener API.
//! - Search endpoint feeds the scan cycle
//! - Token-pairs endpoint backs live evaluation
//!
//! Every request carries a bounded timeout; there are no retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::domain::RawPairRecord;
use crate::ports::market_data::{MarketDataError, PairSource};

/// Public DexScreener API root
pub const DEFAULT_BASE_URL: &str = "https://api.dexscreener.com";

const DEFAULT_USER_AGENT: &str = "sol-hunter-feeder/1.0";

/// DexScreener client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DexScreenerConfig {
    /// API root, without trailing slash
    pub base_url: String,
    /// Search query used by the scan cycle
    pub search_query: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for DexScreenerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            search_query: "solana".to_string(),
            timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// `/latest/dex/search` response body
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    pairs: Option<Vec<RawPairRecord>>,
}

/// DexScreener HTTP client
#[derive(Debug, Clone)]
pub struct DexScreenerClient {
    config: DexScreenerConfig,
    http: Client,
}

impl DexScreenerClient {
    /// Create a client with default configuration
    pub fn new() -> Result<Self, MarketDataError> {
        Self::with_config(DexScreenerConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: DexScreenerConfig) -> Result<Self, MarketDataError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| MarketDataError::Http(e.to_string()))?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &DexScreenerConfig {
        &self.config
    }

    /// `base_url` plus path segments, each segment percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<Url, MarketDataError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| MarketDataError::Http(format!("invalid base url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| MarketDataError::Http("base url cannot take a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn search_url(&self) -> Result<Url, MarketDataError> {
        let mut url = self.endpoint(&["latest", "dex", "search"])?;
        url.query_pairs_mut()
            .append_pair("q", &self.config.search_query);
        Ok(url)
    }

    fn token_pairs_url(&self, mint: &str) -> Result<Url, MarketDataError> {
        self.endpoint(&["token-pairs", "v1", "solana", mint])
    }

    fn map_reqwest(&self, e: reqwest::Error) -> MarketDataError {
        if e.is_timeout() {
            MarketDataError::Timeout(self.config.timeout_secs)
        } else if e.is_decode() {
            MarketDataError::Parse(e.to_string())
        } else {
            MarketDataError::Http(e.to_string())
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: Url) -> Result<T, MarketDataError> {
        tracing::debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_reqwest(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketDataError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| self.map_reqwest(e))?;
        serde_json::from_str(&body).map_err(|e| MarketDataError::Parse(e.to_string()))
    }
}

#[async_trait]
impl PairSource for DexScreenerClient {
    async fn search_pairs(&self) -> Result<Vec<RawPairRecord>, MarketDataError> {
        let url = self.search_url()?;
        let response: SearchResponse = self.get_json(url).await?;
        Ok(response.pairs.unwrap_or_default())
    }

    async fn token_pairs(&self, mint: &str) -> Result<Vec<RawPairRecord>, MarketDataError> {
        let url = self.token_pairs_url(mint)?;
        // null body means "no pairs"
        let pairs: Option<Vec<RawPairRecord>> = self.get_json(url).await?;
        Ok(pairs.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DexScreenerConfig::default();
        assert_eq!(config.base_url, "https://api.dexscreener.com");
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn test_urls() {
        let client = DexScreenerClient::with_config(DexScreenerConfig {
            base_url: "http://localhost:9000/".to_string(),
            ..DexScreenerConfig::default()
        })
        .unwrap();

        assert_eq!(
            client.search_url().unwrap().as_str(),
            "http://localhost:9000/latest/dex/search?q=solana"
        );
        assert_eq!(
            client.token_pairs_url("Mint1").unwrap().as_str(),
            "http://localhost:9000/token-pairs/v1/solana/Mint1"
        );
    }

    #[test]
    fn test_urls_encode_caller_input() {
        let client = DexScreenerClient::with_config(DexScreenerConfig {
            base_url: "http://localhost:9000".to_string(),
            search_query: "sol & friends".to_string(),
            ..DexScreenerConfig::default()
        })
        .unwrap();

        let url = client.token_pairs_url("x/../../latest/dex/search?q=1").unwrap();
        assert!(url.path().starts_with("/token-pairs/v1/solana/"));
        assert_eq!(url.path_segments().unwrap().count(), 4);
        assert!(url.query().is_none());

        let url = client.search_url().unwrap();
        assert_eq!(url.path(), "/latest/dex/search");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs, vec![("q".to_string(), "sol & friends".to_string())]);
    }

    #[test]
    fn test_invalid_base_url_is_error() {
        let client = DexScreenerClient::with_config(DexScreenerConfig {
            base_url: "not a url".to_string(),
            ..DexScreenerConfig::default()
        })
        .unwrap();
        assert!(matches!(client.search_url(), Err(MarketDataError::Http(_))));
    }

    #[test]
    fn test_search_response_parsing() {
        let body = r#"{
            "schemaVersion": "1.0.0",
            "pairs": [
                {
                    "chainId": "solana",
                    "dexId": "raydium",
                    "url": "https://dexscreener.com/solana/abc",
                    "pairAddress": "abc",
                    "baseToken": {"address": "Mint1", "name": "One", "symbol": "ONE"},
                    "quoteToken": {"address": "So11111111111111111111111111111111111111112", "symbol": "SOL"},
                    "priceUsd": "0.01",
                    "txns": {"m5": {"buys": 1, "sells": 0}, "h1": {"buys": 12, "sells": 3}},
                    "volume": {"h24": 150000.5, "h1": 900},
                    "liquidity": {"usd": 42000.0, "base": 1, "quote": 2}
                },
                {"chainId": "bsc"}
            ]
        }"#;

        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        let pairs = parsed.pairs.unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].liquidity.as_ref().unwrap().usd, Some(42000.0));
        assert_eq!(pairs[0].txns.as_ref().unwrap().h1.as_ref().unwrap().buys, Some(12));
    }

    #[test]
    fn test_search_response_null_pairs() {
        let parsed: SearchResponse = serde_json::from_str(r#"{"pairs": null}"#).unwrap();
        assert!(parsed.pairs.is_none());

        let parsed: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.pairs.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_error() {
        let client = DexScreenerClient::with_config(DexScreenerConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_secs: 1,
            ..DexScreenerConfig::default()
        })
        .unwrap();

        assert!(client.search_pairs().await.is_err());
    }
    /// Local stand-in for DexScreener: search fails with 500, token-pairs
    /// answers per mint
    async fn spawn_upstream() -> String {
        use axum::{extract::Path, http::StatusCode, response::IntoResponse, routing::get, Router};

        let app = Router::new()
            .route(
                "/latest/dex/search",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream down") }),
            )
            .route(
                "/token-pairs/v1/solana/:mint",
                get(|Path(mint): Path<String>| async move {
                    match mint.as_str() {
                        "Garbage" => (StatusCode::OK, "not json").into_response(),
                        "Empty" => (StatusCode::OK, "null").into_response(),
                        _ => StatusCode::NOT_FOUND.into_response(),
                    }
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn stub_client() -> DexScreenerClient {
        DexScreenerClient::with_config(DexScreenerConfig {
            base_url: spawn_upstream().await,
            timeout_secs: 5,
            ..DexScreenerConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_non_success_status_is_mapped() {
        let client = stub_client().await;

        let err = client.search_pairs().await.unwrap_err();
        assert!(matches!(err, MarketDataError::Status(500)), "got {:?}", err);

        let err = client.token_pairs("Unknown").await.unwrap_err();
        assert!(matches!(err, MarketDataError::Status(404)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let client = stub_client().await;

        let err = client.token_pairs("Garbage").await.unwrap_err();
        assert!(matches!(err, MarketDataError::Parse(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_null_token_pairs_is_empty() {
        let client = stub_client().await;

        assert!(client.token_pairs("Empty").await.unwrap().is_empty());
    }
}
