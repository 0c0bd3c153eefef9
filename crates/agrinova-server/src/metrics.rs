//! Prometheus metrics recorder and `/metrics` endpoint handler.

use agrinova_retrieval::RetrievalError;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::info;

pub use agrinova_retrieval::gate::{EMBEDDING_DURATION_SECONDS, EMBEDDING_QUEUE_WAITING};

/// Install the Prometheus metrics recorder (global).
///
/// Returns the `PrometheusHandle` used to render the `/metrics` endpoint.
/// Call once at startup before any metrics are recorded; a second call fails.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("prometheus metrics recorder installed");
    Ok(handle)
}

/// Render Prometheus text format from the installed recorder.
pub fn render(handle: &PrometheusHandle) -> String {
    handle.render()
}

/// `/retrieve` requests (counter).
pub const RETRIEVE_REQUESTS_TOTAL: &str = "retrieve_requests_total";
/// `/embed` requests (counter).
pub const EMBED_REQUESTS_TOTAL: &str = "embed_requests_total";
/// Failed query-time embedding calls (counter, labels: endpoint).
pub const EMBEDDING_ERRORS_TOTAL: &str = "embedding_errors_total";

/// Count `err` against `endpoint` if it came from the embedding function.
pub fn record_retrieval_error(endpoint: &'static str, err: &RetrievalError) {
    if matches!(err, RetrievalError::Embedding(_)) {
        metrics::counter!(EMBEDDING_ERRORS_TOTAL, "endpoint" => endpoint).increment(1);
    }
}
