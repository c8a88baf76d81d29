//! Error types for the download module.

use thiserror::Error;

use crate::transport::{RawResponse, TransportError};

/// Errors that can occur during a download.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// The response, for callers that want to inspect an error body.
        response: Box<RawResponse>,
    },

    /// The server answered 2xx with nothing to save.
    #[error("empty payload downloading {url} (HTTP {})", .response.status.as_u16())]
    EmptyPayload {
        url: String,
        /// The response itself, handed back so the caller can inspect it.
        response: Box<RawResponse>,
    },

    /// File system error while saving (create dir, create file, write).
    #[error("IO error writing {filename}: {source}")]
    Io {
        /// Name the payload was being saved under.
        filename: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The provided URL is malformed or invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The one-off client could not be built or the request not encoded.
    #[error("failed to prepare download request: {0}")]
    Client(#[source] TransportError),
}

impl DownloadError {
    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, response: RawResponse) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status: response.status.as_u16(),
            response: Box::new(response),
        }
    }

    /// Creates an empty-payload error.
    pub fn empty_payload(url: impl Into<String>, response: RawResponse) -> Self {
        Self::EmptyPayload {
            url: url.into(),
            response: Box::new(response),
        }
    }

    /// Creates an IO error.
    pub fn io(filename: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            filename: filename.into(),
            source,
        }
    }

    /// The response carried by status and empty-payload errors.
    #[must_use]
    pub fn response(&self) -> Option<&RawResponse> {
        match self {
            Self::HttpStatus { response, .. } | Self::EmptyPayload { response, .. } => {
                Some(response)
            }
            _ => None,
        }
    }
}

impl From<TransportError> for DownloadError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Network { url, source } => Self::Network { url, source },
            TransportError::Timeout { url } => Self::Timeout { url },
            TransportError::InvalidUrl { url } => Self::InvalidUrl { url },
            other => Self::Client(other),
        }
    }
}
