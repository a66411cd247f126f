//! Shared HTTP plumbing for the source adapters.
//!
//! Every client built here carries a hard request timeout, so a stalled
//! upstream surfaces as an ordinary error and the caller falls back.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Browser-like agent; several of the scraped pages reject bare clients.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(timeout.min(Duration::from_secs(5)))
        .timeout(timeout)
        .build()
        .context("failed to build http client")
}

/// GET `url` with `query` and return the body; non-2xx is an error.
pub async fn get_text(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<String> {
    let resp = client
        .get(url)
        .query(query)
        .send()
        .await
        .with_context(|| format!("GET {url}"))?;

    let status = resp.status();
    if !status.is_success() {
        anyhow::bail!("GET {url}: HTTP {status}");
    }
    resp.text()
        .await
        .with_context(|| format!("reading body of {url}"))
}

/// Like [`get_text`], but a 404 gives `Ok(None)` instead of an error.
pub async fn get_text_if_found(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<Option<String>> {
    let resp = client
        .get(url)
        .query(query)
        .send()
        .await
        .with_context(|| format!("GET {url}"))?;

    let status = resp.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        anyhow::bail!("GET {url}: HTTP {status}");
    }
    let body = resp
        .text()
        .await
        .with_context(|| format!("reading body of {url}"))?;
    Ok(Some(body))
}

/// GET `url` and decode the JSON body into `T`.
pub async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<T> {
    let body = get_text(client, url, query).await?;
    serde_json::from_str::<T>(&body).with_context(|| format!("decoding JSON from {url}"))
}
