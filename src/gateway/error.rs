//! Error types for gateway calls.
//!
//! Every variant displays as a human-readable message the caller can show to
//! the user directly.

use thiserror::Error;

/// Why a gateway call did not produce data.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// An identical request was dispatched before this one settled.
    #[error("request superseded by an identical request")]
    Cancelled,

    /// The server answered with a non-success envelope code.
    #[error("{message}")]
    Business {
        /// Envelope code, absent when the body was not an envelope.
        code: Option<i64>,
        /// Server message or generic fallback.
        message: String,
    },

    /// The server reported invalid or expired credentials.
    #[error("{message}")]
    SessionExpired {
        /// HTTP status text or server message.
        message: String,
    },

    /// HTTP error status or no response at all.
    #[error("{message}")]
    Transport {
        /// HTTP status, absent when no response arrived.
        status: Option<u16>,
        /// HTTP status text or the underlying error message.
        message: String,
    },

    /// The request could not be put on the wire.
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// What was wrong with it.
        message: String,
    },

    /// `data` did not match the type the caller asked for.
    #[error("failed to decode response data: {0}")]
    Decode(#[from] serde_json::Error),
}

impl GatewayError {
    /// Creates a business failure.
    pub fn business(code: Option<i64>, message: impl Into<String>) -> Self {
        Self::Business {
            code,
            message: message.into(),
        }
    }

    /// Creates a session-expired failure.
    pub fn session_expired(message: impl Into<String>) -> Self {
        Self::SessionExpired {
            message: message.into(),
        }
    }

    /// Creates a transport failure.
    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Transport {
            status,
            message: message.into(),
        }
    }

    /// Creates an invalid-request failure.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Human-readable message for display.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// HTTP status of the failed response, when one arrived.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }
}
