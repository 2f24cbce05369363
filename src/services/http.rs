//! Shared HTTP client construction.

use std::time::Duration;

use crate::error::NodeError;

/// Build the reqwest client shared by HTTP-backed nodes. Per-node timeouts
/// are applied on each request, so the client itself only carries connect
/// settings.
pub fn build_http_client(connect_timeout_secs: u64) -> Result<reqwest::Client, NodeError> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .build()
        .map_err(|e| NodeError::HttpError(e.to_string()))
}
