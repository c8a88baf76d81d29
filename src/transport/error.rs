//! Errors raised when no HTTP response could be obtained.

use thiserror::Error;

/// Failures below the HTTP status layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before a response arrived.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// The request URL could not be resolved against the base URL.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// The request body could not be serialized.
    #[error("invalid request body: {0}")]
    Body(#[from] serde_json::Error),

    /// A header value contains bytes not allowed on the wire.
    #[error("invalid value for header {name}")]
    InvalidHeader {
        /// Header name.
        name: String,
    },
}

impl TransportError {
    /// Maps a reqwest send error, separating timeouts from other failures.
    pub fn from_reqwest(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Network { url, source }
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an invalid header error.
    pub fn invalid_header(name: impl Into<String>) -> Self {
        Self::InvalidHeader { name: name.into() }
    }

    /// Returns `true` when the request timed out.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display() {
        let error = TransportError::Timeout {
            url: "http://localhost/api/items".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("timeout"), "Expected 'timeout' in: {msg}");
        assert!(msg.contains("/api/items"), "Expected URL in: {msg}");
        assert!(error.is_timeout());
    }

    #[test]
    fn test_invalid_url_display() {
        let msg = TransportError::invalid_url("::bad").to_string();
        assert!(msg.contains("invalid URL"), "Expected 'invalid URL' in: {msg}");
    }

    #[test]
    fn test_invalid_header_display() {
        let msg = TransportError::invalid_header("authorization").to_string();
        assert!(msg.contains("authorization"), "Expected header name in: {msg}");
    }
}
