//! Shared User-Agent string for gateway and download HTTP clients.

/// Default User-Agent for every outbound request (identifies the client and its version).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("request-gateway/{version} (admin-console-client)")
}
