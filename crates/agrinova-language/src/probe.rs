//! Startup reachability check for model sidecars.

use std::time::Duration;

use crate::errors::{LanguageError, Result};

/// How long a sidecar gets to answer the startup probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// `GET {base_url}/health` and require a success status.
pub async fn probe(client: &reqwest::Client, base_url: &str, timeout: Duration) -> Result<()> {
    let url = format!("{}/health", base_url.trim_end_matches('/'));
    let response = client.get(&url).timeout(timeout).send().await?;
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(LanguageError::Upstream {
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        })
    }
}
