//! Shared reqwest plumbing for the upstream adapters
//!
//! Every adapter owns one client built here, so the per-call timeout is applied
//! uniformly. Non-2xx answers become [`LookupError::Upstream`] with the status and
//! raw body kept for error mirroring and logging.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::core::error::{LookupError, SourceResult, Upstream};
use crate::log_debug;

/// Build a client with a request timeout and user agent
pub fn build_client(timeout_secs: u64, user_agent: &str) -> SourceResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(user_agent)
        .build()
        .map_err(|e| LookupError::Config(format!("failed to create HTTP client: {}", e)))
}

/// Send a request, turning transport failures and non-2xx statuses into errors
pub async fn send_checked(upstream: Upstream, request: RequestBuilder) -> SourceResult<Response> {
    let response = request
        .send()
        .await
        .map_err(|e| LookupError::transport(upstream, e))?;

    let status = response.status();
    log_debug!("{} responded with HTTP {}", upstream, status);

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(LookupError::Upstream {
            upstream,
            status: status.as_u16(),
            body,
        });
    }

    Ok(response)
}

/// GET a JSON document and decode it into `T`
pub async fn fetch_json<T: DeserializeOwned>(upstream: Upstream, request: RequestBuilder) -> SourceResult<T> {
    let body = fetch_text(upstream, request).await?;
    serde_json::from_str(&body).map_err(|e| LookupError::parse(upstream, e.to_string()))
}

/// GET an HTML page as text
pub async fn fetch_text(upstream: Upstream, request: RequestBuilder) -> SourceResult<String> {
    send_checked(upstream, request)
        .await?
        .text()
        .await
        .map_err(|e| LookupError::transport(upstream, e))
}
