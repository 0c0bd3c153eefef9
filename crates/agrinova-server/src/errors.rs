//! HTTP error responses.
//!
//! Every failure is rendered as `{"error": "<message>"}` with a status code
//! chosen by kind. Embedding failures get their own status so clients can tell
//! them apart from an empty result list.

use agrinova_language::LanguageError;
use agrinova_retrieval::RetrievalError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Errors returned by request handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The embedding function failed or timed out.
    #[error("embedding failed: {0}")]
    Embedding(String),
    /// The request was syntactically valid but unusable.
    #[error("{0}")]
    BadRequest(String),
    /// The request body exceeded a size limit.
    #[error("{0}")]
    PayloadTooLarge(String),
    /// An optional capability is not available in this deployment.
    #[error("{0}")]
    Unavailable(String),
    /// A model backend answered with an error.
    #[error("{0}")]
    Upstream(String),
    /// Anything else.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Embedding(_) | Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Embedding(_) => "embedding",
            Self::BadRequest(_) => "bad_request",
            Self::PayloadTooLarge(_) => "payload_too_large",
            Self::Unavailable(_) => "unavailable",
            Self::Upstream(_) => "upstream",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<RetrievalError> for ApiError {
    fn from(err: RetrievalError) -> Self {
        match err {
            RetrievalError::Embedding(e) => Self::Embedding(e.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<LanguageError> for ApiError {
    fn from(err: LanguageError) -> Self {
        match err {
            LanguageError::NotAvailable(msg) => Self::Unavailable(msg),
            LanguageError::InvalidInput(msg) => Self::BadRequest(msg),
            e @ LanguageError::AudioTooLarge { .. } => Self::PayloadTooLarge(e.to_string()),
            e @ (LanguageError::Request(_)
            | LanguageError::Upstream { .. }
            | LanguageError::InvalidResponse(_)) => Self::Upstream(e.to_string()),
            e @ LanguageError::Io(_) => Self::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(kind = self.kind(), error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
