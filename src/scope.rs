//! Scope-injection policy shared by the gateway and the stream downloader.
//!
//! Mutating requests (`POST`/`PUT`) carry the scope id in the body; every
//! other method carries it as a query parameter appended to the URL. Paths on
//! the allow-list are left untouched.

use serde_json::{Map, Value};
use tracing::debug;

use crate::request::{ApiRequest, RequestBody, ScopeId};

/// Default name of the injected scope parameter.
pub const DEFAULT_SCOPE_PARAM: &str = "spac_id";

/// Scope id used when the session has no current workspace.
pub const DEFAULT_SCOPE_ID: ScopeId = 1401;

/// Paths exempt from scope injection by default.
pub const DEFAULT_ALLOW_LIST: &[&str] = &["/api/maas/auths/captcha"];

/// How and where the scope id is attached to outbound requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopePolicy {
    param: String,
    default_scope_id: ScopeId,
    allow_list: Vec<String>,
}

impl Default for ScopePolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_SCOPE_PARAM,
            DEFAULT_SCOPE_ID,
            DEFAULT_ALLOW_LIST.iter().map(ToString::to_string),
        )
    }
}

impl ScopePolicy {
    pub fn new(
        param: impl Into<String>,
        default_scope_id: ScopeId,
        allow_list: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            param: param.into(),
            default_scope_id,
            allow_list: allow_list.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn param(&self) -> &str {
        &self.param
    }

    /// Returns `true` when the request path is on the allow-list.
    #[must_use]
    pub fn is_exempt(&self, request: &ApiRequest) -> bool {
        let path = request.path();
        self.allow_list.iter().any(|allowed| *allowed == path)
    }

    /// Attaches the scope id to `request`.
    ///
    /// For `POST`/`PUT` the body becomes `{param: scope}` with the caller's
    /// object merged over it, so caller keys win on collision. Other methods
    /// get `param=scope` appended to the URL.
    #[must_use]
    pub fn apply(&self, mut request: ApiRequest, scope_id: Option<ScopeId>) -> ApiRequest {
        if self.is_exempt(&request) {
            debug!(path = %request.path(), "scope injection skipped for allow-listed path");
            return request;
        }

        let scope_id = scope_id.unwrap_or(self.default_scope_id);
        if request.is_mutating() {
            request.body = self.merge_body(request.body.take(), scope_id);
        } else {
            request.url = append_query_param(&request.url, &self.param, scope_id);
        }
        request
    }

    fn merge_body(&self, body: Option<RequestBody>, scope_id: ScopeId) -> Option<RequestBody> {
        let mut merged = Map::new();
        merged.insert(self.param.clone(), Value::from(scope_id));

        let Some(body) = body else {
            return Some(RequestBody::Json(Value::Object(merged)));
        };

        match body.to_value() {
            Ok(Value::Object(fields)) => {
                merged.extend(fields);
                Some(RequestBody::Json(Value::Object(merged)))
            }
            Ok(Value::Null) => Some(RequestBody::Json(Value::Object(merged))),
            Ok(_) | Err(_) => {
                debug!("request body is not a JSON object; scope id not merged");
                Some(body)
            }
        }
    }
}

fn append_query_param(url: &str, param: &str, scope_id: ScopeId) -> String {
    let separator = if !url.contains('?') {
        "?"
    } else if url.ends_with('?') || url.ends_with('&') {
        ""
    } else {
        "&"
    };
    format!("{url}{separator}{param}={scope_id}")
}
