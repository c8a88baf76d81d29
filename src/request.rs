//! Outbound request model shared by the gateway and the stream downloader.

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use url::Url;

/// Workspace/tenant identifier injected into scoped requests.
pub type ScopeId = i64;

/// How the caller wants the response body handed back.
///
/// Binary types skip envelope parsing entirely; the raw response is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseType {
    /// `{code, data, msg}` envelope, unwrapped to `data`.
    #[default]
    Json,
    /// Binary payload returned as-is.
    Blob,
    /// Binary payload returned as-is.
    ArrayBuffer,
}

impl ResponseType {
    /// Returns `true` for response types that do not carry the JSON envelope.
    #[must_use]
    pub fn is_binary(self) -> bool {
        matches!(self, Self::Blob | Self::ArrayBuffer)
    }
}

/// Request body as supplied by the caller.
///
/// A body echoed back from a settled call arrives already serialized; both
/// forms describe the same logical payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Structured JSON body.
    Json(Value),
    /// JSON body that has already been serialized to a string.
    Serialized(String),
}

impl RequestBody {
    /// Returns the body as a JSON value, parsing the serialized form.
    ///
    /// # Errors
    ///
    /// Returns an error when a serialized body is not valid JSON.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::Json(value) => Ok(value.clone()),
            Self::Serialized(raw) => serde_json::from_str(raw),
        }
    }

    /// Returns the bytes to put on the wire.
    ///
    /// # Errors
    ///
    /// Returns an error when the JSON value cannot be serialized.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        match self {
            Self::Json(value) => serde_json::to_vec(value),
            Self::Serialized(raw) => Ok(raw.clone().into_bytes()),
        }
    }
}

/// A JSON API call before auth and scope metadata are attached.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the base URL, or an absolute URL.
    pub url: String,
    /// Query parameters (a JSON object).
    pub query: Option<Value>,
    /// Request body.
    pub body: Option<RequestBody>,
    /// Extra headers supplied by the caller.
    pub headers: HeaderMap,
    /// Expected response type.
    pub response_type: ResponseType,
}

impl ApiRequest {
    /// Creates a request with no query, body or extra headers.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: None,
            body: None,
            headers: HeaderMap::new(),
            response_type: ResponseType::Json,
        }
    }

    /// Creates a `GET` request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Creates a `POST` request.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Creates a `PUT` request.
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    /// Creates a `DELETE` request.
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    #[must_use]
    pub fn with_query(mut self, query: Value) -> Self {
        self.query = Some(query);
        self
    }

    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    #[must_use]
    pub fn with_serialized_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Serialized(body.into()));
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn with_response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    /// Returns `true` for methods that carry scope metadata in the body.
    #[must_use]
    pub fn is_mutating(&self) -> bool {
        self.method == Method::POST || self.method == Method::PUT
    }

    /// Path component of the URL, without query string or fragment.
    #[must_use]
    pub fn path(&self) -> String {
        if is_external(&self.url)
            && let Ok(parsed) = Url::parse(&self.url)
        {
            return parsed.path().to_string();
        }
        self.url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string()
    }
}

/// Returns `true` when `path` is an absolute link that must bypass the base URL.
#[must_use]
pub fn is_external(path: &str) -> bool {
    let lower = path.trim_start().to_ascii_lowercase();
    ["http:", "https:", "mailto:", "tel:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}
