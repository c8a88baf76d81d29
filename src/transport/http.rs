//! reqwest-backed [`Transport`] bound to a single base URL.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, ClientBuilder};
use tracing::{debug, instrument};
use url::Url;

use super::{PreparedRequest, RawResponse, Transport, TransportError};
use crate::request::is_external;
use crate::user_agent;

/// Content type of every JSON request body.
pub const JSON_CONTENT_TYPE: &str = "application/json;charset=utf-8";

/// Upper bound on connection establishment, independent of the request timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP transport for a single API base URL.
///
/// Create it once and share it; the inner client pools connections.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Creates the JSON API transport with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the base URL is invalid or the client
    /// cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        let client = base_client_builder(timeout)
            .default_headers(headers)
            .build()
            .map_err(TransportError::Build)?;
        Self::with_client(client, base_url)
    }

    /// Creates a one-off transport for binary downloads.
    ///
    /// `with_credentials` enables a cookie store so session cookies set by the
    /// server are sent back on redirects.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the base URL is invalid or the client
    /// cannot be built.
    pub fn for_download(
        base_url: &str,
        timeout: Duration,
        with_credentials: bool,
    ) -> Result<Self, TransportError> {
        let client = base_client_builder(timeout)
            .cookie_store(with_credentials)
            .build()
            .map_err(TransportError::Build)?;
        Self::with_client(client, base_url)
    }

    /// Wraps an existing client.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidUrl`] if `base_url` is not absolute.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self, TransportError> {
        Url::parse(base_url).map_err(|_| TransportError::invalid_url(base_url))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins `url` onto the base URL; absolute URLs are used as-is.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidUrl`] if the result does not parse.
    pub fn resolve_url(&self, url: &str) -> Result<Url, TransportError> {
        let joined = if is_external(url) {
            url.trim().to_string()
        } else if url.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url, url.trim_start_matches('/'))
        };
        Url::parse(&joined).map_err(|_| TransportError::invalid_url(joined))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(level = "debug", skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: PreparedRequest) -> Result<RawResponse, TransportError> {
        let mut url = self.resolve_url(&request.url)?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }

        let mut builder = self
            .client
            .request(request.method, url.clone())
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(url.as_str(), e))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::from_reqwest(url.as_str(), e))?
            .to_vec();

        debug!(status = status.as_u16(), bytes = body.len(), "response received");
        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

fn base_client_builder(timeout: Duration) -> ClientBuilder {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .timeout(timeout)
        .gzip(true)
        .user_agent(user_agent::default_user_agent())
}
