//! Request fingerprints for de-duplication.

use std::fmt;

use serde_json::Value;

use crate::request::{ApiRequest, RequestBody};

/// Key identifying logically identical requests.
///
/// Built from `url & method & query & body`. A serialized body is parsed back
/// to JSON first, and JSON objects serialize with sorted keys, so neither the
/// body's representation nor its key order changes the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    #[must_use]
    pub fn of(request: &ApiRequest) -> Self {
        let method = request.method.as_str().to_ascii_lowercase();
        let query = request.query.as_ref().map(Value::to_string).unwrap_or_default();
        let body = request.body.as_ref().map(body_key).unwrap_or_default();
        Self([request.url.as_str(), &method, &query, &body].join("&"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn body_key(body: &RequestBody) -> String {
    match body.to_value() {
        Ok(value) => value.to_string(),
        Err(_) => match body {
            RequestBody::Serialized(raw) => raw.clone(),
            RequestBody::Json(value) => value.to_string(),
        },
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
