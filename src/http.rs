//! Shared HTTP plumbing for the storefront, REST, and flat-file adapters.

use reqwest::{Client, Response};
use std::time::Duration;

use crate::error::AdapterError;

/// Build a client with the adapter's transport timeout.
pub fn client(adapter: &str, timeout_secs: u64) -> Result<Client, AdapterError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("catalog-harness/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| AdapterError::connection(adapter, e))
}

/// Pass through a success response; classify anything else.
pub async fn check_status(adapter: &str, resp: Response) -> Result<Response, AdapterError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    Err(AdapterError::from_status(adapter, status, &body))
}

/// Send a request, check the status, and decode the JSON body.
pub async fn send_json(
    adapter: &str,
    request: reqwest::RequestBuilder,
) -> Result<(reqwest::header::HeaderMap, serde_json::Value), AdapterError> {
    let resp = request
        .send()
        .await
        .map_err(|e| AdapterError::from_reqwest(adapter, e))?;
    let resp = check_status(adapter, resp).await?;
    let headers = resp.headers().clone();
    let text = resp
        .text()
        .await
        .map_err(|e| AdapterError::from_reqwest(adapter, e))?;
    let body = serde_json::from_str(&text).map_err(|e| AdapterError::parse(adapter, e))?;
    Ok((headers, body))
}
