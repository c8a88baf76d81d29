//! HTTP transport seam.
//!
//! The gateway hands a fully prepared request to a [`Transport`] and gets back
//! whatever the server answered, for any status code. Only failures where no
//! response arrived are errors at this layer; status classification belongs to
//! the caller. Dropping the future returned by [`Transport::send`] aborts the
//! call, which is how superseded requests are cancelled.

mod error;
mod http;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName};
use reqwest::{Method, StatusCode};
use serde_json::Value;

use crate::request::ApiRequest;

pub use error::TransportError;
pub use http::{JSON_CONTENT_TYPE, ReqwestTransport};

/// A request ready for the wire: auth headers and scope metadata attached.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    /// Path relative to the transport's base URL, or an absolute URL.
    pub url: String,
    /// Query pairs appended after any query string already in `url`.
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl PreparedRequest {
    /// Lowers an [`ApiRequest`] to wire form, adding `headers` over the caller's.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Body`] when the body cannot be serialized.
    pub fn from_api(request: ApiRequest, headers: HeaderMap) -> Result<Self, TransportError> {
        let ApiRequest {
            method,
            url,
            query,
            body,
            headers: mut merged,
            ..
        } = request;
        merged.extend(headers);
        let body = body.map(|body| body.to_bytes()).transpose()?;
        Ok(Self {
            method,
            url,
            query: query.as_ref().map(query_pairs).unwrap_or_default(),
            headers: merged,
            body,
        })
    }
}

/// Flattens a JSON query object into string pairs; `null` values are dropped.
fn query_pairs(query: &Value) -> Vec<(String, String)> {
    let Value::Object(fields) = query else {
        return Vec::new();
    };
    fields
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| {
            let value = match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            (key.clone(), value)
        })
        .collect()
}

/// Whatever the server answered.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Canonical reason phrase of the status, empty when unknown.
    #[must_use]
    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or_default()
    }

    /// Header value as text, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header(&CONTENT_TYPE)
    }
}

/// Sends prepared requests.
///
/// Implementations must make the returned future abortable by drop.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request`, returning the response for any HTTP status.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no response was received.
    async fn send(&self, request: PreparedRequest) -> Result<RawResponse, TransportError>;
}
