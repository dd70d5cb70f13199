//! Shared HTTP client and response mapping for the external adapters.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::MarketplaceError;

/// One client for all upstream APIs, with a bounded per-request timeout.
pub fn build_http_client(timeout_secs: u64) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .build()
}

/// Read the body of a response, failing with `Upstream` on transport errors
/// and non-2xx statuses.
pub async fn read_success(
    response: reqwest::Response,
    context: &'static str,
) -> Result<bytes::Bytes, MarketplaceError> {
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| MarketplaceError::upstream(e, context))?;
    if !status.is_success() {
        let detail = String::from_utf8_lossy(&body);
        return Err(MarketplaceError::upstream(
            anyhow::anyhow!("status {status}: {detail}"),
            context,
        ));
    }
    Ok(body)
}

pub async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    context: &'static str,
) -> Result<T, MarketplaceError> {
    let body = read_success(response, context).await?;
    serde_json::from_slice(&body).map_err(|e| MarketplaceError::upstream(e, context))
}
