// src/fetch/mod.rs

use crate::config::ServiceConfig;
use crate::error::{Error, Result};
use reqwest::Client;
use tracing::{debug, info};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Build the shared HTTP client with a browser-like UA and the configured timeout.
pub fn build_client(cfg: &ServiceConfig) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(cfg.fetch_timeout)
        .build()
        .map_err(|e| Error::Config(format!("building HTTP client: {e}")))
}

/// GET `url` and return the body text. Any transport failure or non-2xx status is a
/// `Error::Network`; there is no retry.
pub async fn fetch_document(client: &Client, url: &str) -> Result<String> {
    let network = |source| Error::Network {
        url: url.to_string(),
        source,
    };

    let resp = client
        .get(url)
        .send()
        .await
        .map_err(network)?
        .error_for_status()
        .map_err(network)?;
    debug!(url, status = %resp.status(), "response headers received");

    let html = resp.text().await.map_err(network)?;
    info!(url, bytes = html.len(), "fetched document");
    Ok(html)
}
