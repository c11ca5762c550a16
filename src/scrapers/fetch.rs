//! Index page fetching.
//!
//! One GET per run with a desktop browser `User-Agent` and a Hong Kong
//! Chinese `Accept-Language`, since the site serves a reduced page to unknown
//! clients. Non-2xx responses are errors. There are no retries.

use crate::config::FeedConfig;
use crate::error::FeedError;
use reqwest::Client;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;
use tracing::{info, instrument};

/// Build the HTTP client with the configured headers and timeout.
pub fn build_client(config: &FeedConfig) -> Result<Client, FeedError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, header_value(&config.user_agent)?);
    headers.insert(ACCEPT_LANGUAGE, header_value(&config.accept_language)?);

    Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| FeedError::Config(format!("HTTP client: {e}")))
}

fn header_value(value: &str) -> Result<HeaderValue, FeedError> {
    HeaderValue::from_str(value)
        .map_err(|e| FeedError::Config(format!("header value {value:?}: {e}")))
}

/// Fetch the index page body as text.
///
/// Sends a single GET to `config.index_url` through a client built by
/// [`build_client`].
///
/// # Arguments
///
/// * `config` - Supplies the URL, request headers and timeout
///
/// # Returns
///
/// The response body, guaranteed to contain non-whitespace text.
///
/// # Errors
///
/// - [`FeedError::Fetch`] on transport failures, timeouts and non-2xx statuses
/// - [`FeedError::EmptyPage`] if the body is blank
#[instrument(level = "info", skip_all, fields(url = %config.index_url))]
pub async fn fetch_index_page(config: &FeedConfig) -> Result<String, FeedError> {
    let client = build_client(config)?;
    let url = config.index_url.as_str();
    let fetch_err = |source| FeedError::Fetch {
        url: url.to_string(),
        source,
    };

    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(fetch_err)?;
    let status = response.status();
    let body = response.text().await.map_err(fetch_err)?;

    if body.trim().is_empty() {
        return Err(FeedError::EmptyPage(url.to_string()));
    }

    info!(status = status.as_u16(), bytes = body.len(), "Fetched index page");
    Ok(body)
}
