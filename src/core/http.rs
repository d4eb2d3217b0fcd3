//! HTTP client utilities.
//!
//! One cookie-carrying client per run; every response is checked for a 2xx
//! status and read fully into a [`Page`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, ClientBuilder, RequestBuilder};
use url::Url;

use crate::error::{Play24Error, Result};

/// Default timeout for portal requests and waits.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// A fetched document and the URL it was finally served from.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: Url,
    pub body: String,
}

/// Build a configured HTTP client sharing `jar`.
///
/// # Errors
///
/// Returns error if client construction fails.
pub fn build_client(timeout: Duration, jar: Arc<Jar>) -> Result<Client> {
    ClientBuilder::new()
        .timeout(timeout)
        .cookie_provider(jar)
        .user_agent(format!("play24/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Play24Error::Network(e.to_string()))
}

/// Send a request and read the body, failing on non-2xx.
async fn send(request: RequestBuilder, timeout: Duration) -> Result<Page> {
    let secs = timeout.as_secs();
    let response = request
        .send()
        .await
        .map_err(|e| Play24Error::from_reqwest(&e, secs))?;

    let status = response.status();
    let url = response.url().clone();
    tracing::debug!(%url, status = status.as_u16(), "response");

    if !status.is_success() {
        return Err(Play24Error::Transport {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| Play24Error::from_reqwest(&e, secs))?;
    Ok(Page { url, body })
}

/// GET a URL.
///
/// # Errors
///
/// Returns error on network failure or non-2xx status.
pub async fn get(client: &Client, url: &Url, timeout: Duration) -> Result<Page> {
    tracing::debug!(%url, "GET");
    send(client.get(url.clone()), timeout).await
}

/// POST url-encoded form fields.
///
/// # Errors
///
/// Returns error on network failure or non-2xx status.
pub async fn post_form(
    client: &Client,
    url: &Url,
    fields: &[(String, String)],
    timeout: Duration,
) -> Result<Page> {
    let body = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish();
    tracing::debug!(%url, fields = fields.len(), "POST form");
    let request = client
        .post(url.clone())
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(body);
    send(request, timeout).await
}

/// POST a plain-text body as US-ASCII bytes.
///
/// # Errors
///
/// Returns [`Play24Error::Protocol`] for a non-ASCII body, otherwise errors on
/// network failure or non-2xx status.
pub async fn post_plain(client: &Client, url: &Url, body: String, timeout: Duration) -> Result<Page> {
    if !body.is_ascii() {
        return Err(Play24Error::Protocol(format!(
            "request body for {url} is not US-ASCII"
        )));
    }
    tracing::debug!(%url, bytes = body.len(), "POST plain");
    let request = client
        .post(url.clone())
        .header(CONTENT_TYPE, "text/plain")
        .body(body.into_bytes());
    send(request, timeout).await
}
