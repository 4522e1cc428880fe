//! HTTP plumbing: the [`HttpClient`] seam, the plain reqwest-backed client and
//! request-signing decorators.

mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use tracing::debug;

use crate::error::{ConfigError, Error, Result};

/// GETs `url` and returns the response body.
///
/// # Errors
///
/// [`Error::Config`] if `url` does not parse, [`Error::Fetch`] on transport
/// failure or a non-success status.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let parsed = url.parse::<reqwest::Url>().map_err(|e| ConfigError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let req = reqwest::Request::new(reqwest::Method::GET, parsed);

    let resp = client
        .execute(req)
        .await
        .map_err(|e| Error::fetch_with_source(format!("requesting {url}"), e))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(Error::fetch_status(
            format!("{url} returned status {status}"),
            status.as_u16(),
        ));
    }

    let bytes = resp
        .bytes()
        .await
        .map_err(|e| Error::fetch_with_source(format!("reading body of {url}"), e))?;
    debug!(url, bytes = bytes.len(), "Fetched response body");
    Ok(bytes.to_vec())
}
