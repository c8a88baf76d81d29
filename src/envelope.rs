//! The `{code, data, msg}` envelope wrapping every non-binary server response.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Server response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Result code; compared against [`ResultCodes`].
    pub code: i64,
    /// Payload returned to the caller on success.
    #[serde(default)]
    pub data: Value,
    /// Human-readable message, usually present on failure.
    #[serde(default)]
    pub msg: Option<String>,
}

impl ResponseEnvelope {
    /// Parses an envelope from a response body.
    ///
    /// Returns `None` when the body is not JSON or lacks a numeric `code`;
    /// callers treat that as a business failure.
    #[must_use]
    pub fn from_slice(body: &[u8]) -> Option<Self> {
        serde_json::from_slice(body).ok()
    }
}

/// Structured body of an error response.
///
/// Error bodies are not guaranteed to be envelopes, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorBody {
    pub code: Option<i64>,
    pub msg: Option<String>,
}

impl ErrorBody {
    #[must_use]
    pub fn from_slice(body: &[u8]) -> Self {
        let Ok(Value::Object(fields)) = serde_json::from_slice::<Value>(body) else {
            return Self::default();
        };
        Self {
            code: fields.get("code").and_then(Value::as_i64),
            msg: fields
                .get("msg")
                .and_then(Value::as_str)
                .filter(|msg| !msg.is_empty())
                .map(str::to_string),
        }
    }
}

/// Enumerated result codes the server uses in the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultCodes {
    /// Success sentinel.
    pub success: i64,
    /// Credentials invalid or expired. Only honored on error statuses.
    pub token_invalid: i64,
}

impl Default for ResultCodes {
    fn default() -> Self {
        Self {
            success: 200,
            token_invalid: 401,
        }
    }
}

/// Classification of a parsed envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvelopeOutcome {
    /// `code` is the success sentinel; carries `data`.
    Success(Value),
    /// Any other code, the token-invalid code included.
    Failure { code: i64, msg: Option<String> },
}

impl ResultCodes {
    /// Classifies an envelope by its code.
    #[must_use]
    pub fn classify(&self, envelope: ResponseEnvelope) -> EnvelopeOutcome {
        let msg = envelope.msg.filter(|msg| !msg.is_empty());
        if envelope.code == self.success {
            EnvelopeOutcome::Success(envelope.data)
        } else {
            EnvelopeOutcome::Failure {
                code: envelope.code,
                msg,
            }
        }
    }
}
