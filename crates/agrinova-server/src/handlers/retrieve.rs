//! `POST /retrieve`: nearest advisories for a query text.

use agrinova_retrieval::{RetrievalHit, TopK};
use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::errors::ApiError;
use crate::metrics::{RETRIEVE_REQUESTS_TOTAL, record_retrieval_error};
use crate::server::AppState;

/// Request body.
#[derive(Debug, Deserialize)]
pub struct RetrieveRequest {
    /// Query text.
    pub text: String,
    /// Number of results; malformed or non-positive values mean none.
    #[serde(default)]
    pub top_k: TopK,
    /// Query language. Accepted for client compatibility; retrieval is
    /// language-agnostic.
    #[serde(default = "default_lang")]
    pub lang: String,
}

fn default_lang() -> String {
    "ml".into()
}

/// Response body.
#[derive(Debug, Serialize)]
pub struct RetrieveResponse {
    /// Closest advisories first.
    pub results: Vec<RetrievalHit>,
}

/// Handle `POST /retrieve`.
#[instrument(skip_all)]
pub async fn retrieve(
    State(state): State<AppState>,
    Json(req): Json<RetrieveRequest>,
) -> Result<Json<RetrieveResponse>, ApiError> {
    metrics::counter!(RETRIEVE_REQUESTS_TOTAL).increment(1);
    debug!(lang = %req.lang, "retrieve request");

    let results = state
        .context
        .retriever
        .retrieve(&req.text, req.top_k)
        .await
        .map_err(|e| {
            record_retrieval_error("retrieve", &e);
            ApiError::from(e)
        })?;
    Ok(Json(RetrieveResponse { results }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use agrinova_embeddings::MockEmbeddingService;
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::handlers::test_helpers::{ContextBuilder, TEST_DIMENSIONS, body_json, json_request};
    use crate::server::build_router;

    async fn post(builder: ContextBuilder, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let app = build_router(builder.state().await, 1 << 20);
        let resp = app.oneshot(json_request("/retrieve", &body)).await.unwrap();
        let status = resp.status();
        (status, body_json(resp).await)
    }

    #[tokio::test]
    async fn fertilizer_query_finds_nitrogen_advisory() {
        let (status, body) = post(
            ContextBuilder::new(),
            json!({"text": "fertilizer before rains", "top_k": 1}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["id"], "a1");
        assert_eq!(results[0]["title"], "Nitrogen timing");
        assert_eq!(results[0]["excerpt"], "apply nitrogen fertilizer before monsoon");
        assert!(results[0]["score"].is_number());
    }

    #[tokio::test]
    async fn default_top_k_caps_at_corpus_size() {
        let (_, body) = post(ContextBuilder::new(), json!({"text": "paddy"})).await;
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        let first = results[0]["score"].as_f64().unwrap();
        let second = results[1]["score"].as_f64().unwrap();
        assert!(first <= second);
        assert_eq!(results[0]["id"], "a2");
        assert_eq!(results[0]["title"], "");
        assert_eq!(results[1]["id"], "a1");
        assert_eq!(results[1]["title"], "Nitrogen timing");
    }

    #[tokio::test]
    async fn empty_corpus_returns_no_results() {
        let (status, body) = post(
            ContextBuilder::new().records(vec![]),
            json!({"text": "anything", "top_k": 10}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"results": []}));
    }

    #[tokio::test]
    async fn malformed_top_k_returns_no_results() {
        for top_k in [json!(0), json!(-3), json!("five"), json!(2.5), json!(null)] {
            let (status, body) =
                post(ContextBuilder::new(), json!({"text": "paddy", "top_k": top_k})).await;
            assert_eq!(status, StatusCode::OK, "top_k={top_k}");
            assert_eq!(body["results"].as_array().unwrap().len(), 0, "top_k={top_k}");
        }
    }

    #[tokio::test]
    async fn lang_is_accepted() {
        let (status, _) = post(
            ContextBuilder::new(),
            json!({"text": "paddy", "lang": "en", "top_k": 1}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn embedding_failure_is_503() {
        let mock = Arc::new(MockEmbeddingService::new(TEST_DIMENSIONS));
        let builder = ContextBuilder::new().embedder(mock.clone());
        let app = build_router(builder.state().await, 1 << 20);
        mock.set_ready(false);

        let resp = app
            .oneshot(json_request("/retrieve", &json!({"text": "paddy"})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(resp).await;
        assert!(body["error"].as_str().unwrap().starts_with("embedding failed"));
    }

    #[tokio::test]
    async fn missing_text_is_rejected() {
        let (status, _) = post(ContextBuilder::new(), json!({"top_k": 2})).await;
        assert!(status.is_client_error());
    }
}
