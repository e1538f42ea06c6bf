// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Blocking client with a browser user agent and a single request timeout.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .cookie_store(true)
        .timeout(timeout)
        .build()
        .context("building HTTP client")
}

/// Check that `raw` is an absolute http(s) URL.
pub fn parse_page_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("invalid URL `{}`", raw))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => anyhow::bail!("unsupported URL scheme `{}` in {}", other, url),
    }
}

/// GET the page body as text (charset decoded from the response headers).
pub fn fetch_page(client: &Client, url: &Url) -> Result<String> {
    info!(%url, "fetching page");
    let body = client
        .get(url.clone())
        .send()
        .with_context(|| format!("GET {} failed", url))?
        .error_for_status()
        .with_context(|| format!("Non-success status {}", url))?
        .text()
        .with_context(|| format!("Reading text from {}", url))?;
    debug!(%url, bytes = body.len(), "page fetched");
    Ok(body)
}

/// Stem for output files derived from the last meaningful path segment,
/// e.g. `.../Mens-200-Meters` -> `mens-200-meters`.
pub fn output_stem(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|mut s| s.rfind(|seg| !seg.is_empty()))
        .unwrap_or("page");
    let stem: String = segment
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect::<String>()
        .to_lowercase();
    if stem.is_empty() {
        "page".to_string()
    } else {
        stem
    }
}
