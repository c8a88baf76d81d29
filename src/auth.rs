//! Credential headers attached to outbound requests.

use reqwest::header::{HeaderValue, InvalidHeaderValue};

/// Header carrying the per-request identity timestamp.
pub const REQUEST_IDENTITY_HEADER: &str = "x-request-identity";

/// Default local-storage key under which the access token is kept.
pub const DEFAULT_TOKEN_KEY: &str = "Admin-Token";

const BEARER_PREFIX: &str = "Bearer ";

/// Builds the `Authorization` header value for `token`.
///
/// Tokens stored with their scheme already attached are sent unchanged.
///
/// # Errors
///
/// Returns an error when the token contains bytes not allowed in a header.
pub fn authorization_value(token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let token = token.trim();
    let mut value = if token
        .get(..BEARER_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(BEARER_PREFIX))
    {
        HeaderValue::from_str(token)?
    } else {
        HeaderValue::from_str(&format!("{BEARER_PREFIX}{token}"))?
    };
    value.set_sensitive(true);
    Ok(value)
}

/// Masks a secret for logs: first 2 and last 4 characters, `****` between.
///
/// Secrets too short to mask that way are hidden completely.
#[must_use]
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() < 6 {
        return "****".to_string();
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}****{tail}")
}
