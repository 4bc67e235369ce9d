//! Read API Routes
//!
//! Handlers map query-service results to JSON; the only non-200 answers are
//! extractor rejections (400) and live-mode misses (404).

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::application::{EvaluateError, QueryService};

pub type AppState = Arc<QueryService>;

/// Create the read API routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/scan", get(scan))
        .route("/evaluate", get(evaluate))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct ScanParams {
    /// Kept as text so a malformed value falls back to the default
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateParams {
    pub mint: String,
}

/// GET /health
async fn health(State(service): State<AppState>) -> Response {
    Json(service.health().await).into_response()
}

/// GET /scan?limit=N
async fn scan(State(service): State<AppState>, Query(params): Query<ScanParams>) -> Response {
    let limit = params.limit.as_deref().and_then(|raw| raw.trim().parse::<usize>().ok());
    if params.limit.is_some() && limit.is_none() {
        tracing::debug!("Ignoring invalid scan limit {:?}", params.limit);
    }
    Json(service.scan(limit).await).into_response()
}

/// GET /evaluate?mint=<id>
async fn evaluate(State(service): State<AppState>, Query(params): Query<EvaluateParams>) -> Response {
    match service.evaluate(params.mint.trim()).await {
        Ok(evaluation) => Json(evaluation).into_response(),
        Err(EvaluateError::NotFound { mint }) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "not_found", "mint": mint })),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::MemoryStore;
    use crate::application::{EvaluateMode, QueryConfig};
    use crate::ports::mocks::MockPairSource;
    use crate::ports::store::{keys, CandidateStore};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn router(store: &MemoryStore, mode: EvaluateMode) -> Router {
        let config = QueryConfig {
            evaluate_mode: mode,
            ..QueryConfig::default()
        };
        let service = QueryService::new(config, Arc::new(store.clone()), Arc::new(MockPairSource::new()));
        create_router(Arc::new(service))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let store = MemoryStore::new();
        let (status, json) = get_json(router(&store, EvaluateMode::Cached), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["scan_seq"], 0);
        assert_eq!(json["last_update_ms"], 0);
        assert_eq!(json["env"]["HELIUS_API_KEY"], false);
    }

    #[tokio::test]
    async fn test_scan_endpoint_empty_store() {
        let store = MemoryStore::new();
        let (status, json) = get_json(router(&store, EvaluateMode::Cached), "/scan?limit=5").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_scan_endpoint_bad_limit_uses_default() {
        let store = MemoryStore::new();
        let (status, _) = get_json(router(&store, EvaluateMode::Cached), "/scan?limit=lots").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_evaluate_endpoint_cached_default() {
        let store = MemoryStore::new();
        let (status, json) = get_json(router(&store, EvaluateMode::Cached), "/evaluate?mint=Nope").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "BLOCKED");
        assert_eq!(json["reasons"][0], "not_enough_data");
    }

    #[tokio::test]
    async fn test_evaluate_endpoint_serves_block_record() {
        let store = MemoryStore::new();
        store
            .set(&keys::block("Rug"), r#"{"status":"BLOCKED","reasons":["blocklisted"]}"#)
            .await
            .unwrap();
        let (_, json) = get_json(router(&store, EvaluateMode::Cached), "/evaluate?mint=Rug").await;
        assert_eq!(json["reasons"][0], "blocklisted");
    }

    #[tokio::test]
    async fn test_evaluate_endpoint_live_not_found() {
        let store = MemoryStore::new();
        let (status, json) = get_json(router(&store, EvaluateMode::Live), "/evaluate?mint=Ghost").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "not_found");
        assert_eq!(json["mint"], "Ghost");
    }

    #[tokio::test]
    async fn test_evaluate_endpoint_requires_mint() {
        let store = MemoryStore::new();
        let (status, _) = get_json(router(&store, EvaluateMode::Cached), "/evaluate").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
