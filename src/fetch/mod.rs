mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Result, anyhow};
use reqwest::header::{ACCEPT, HeaderValue};
use serde_json::Value;

/// Issues a GET for `url` with `query` pairs and returns the JSON body.
///
/// # Errors
///
/// Returns an error on transport failure, a non-success status, or a body
/// that is not JSON.
pub async fn fetch_json<C: HttpClient>(
    client: &C,
    url: &str,
    query: &[(&str, String)],
) -> Result<Value> {
    let mut url: reqwest::Url = url.parse()?;
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query {
            pairs.append_pair(key, value);
        }
    }
    if url.query() == Some("") {
        url.set_query(None);
    }

    let mut req = reqwest::Request::new(reqwest::Method::GET, url);
    req.headers_mut()
        .insert(ACCEPT, HeaderValue::from_static("application/json"));

    let resp = client.execute(req).await?;
    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(anyhow!("request failed with status {}: {}", status, body));
    }

    Ok(resp.json().await?)
}
