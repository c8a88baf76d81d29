//! Filename resolution for saved downloads.

use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

/// Name used when neither the server nor the caller supplies one.
pub const DEFAULT_FILENAME: &str = "unknown-file.xlsx";

/// `filename*=charset'lang'value` (RFC 5987).
#[allow(clippy::expect_used)]
static EXTENDED_FILENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)filename\*\s*=\s*([^;]+)").expect("extended filename regex is valid") // Static pattern, safe to panic
});

/// `filename=value` or `fileName="value"`, in any case.
#[allow(clippy::expect_used)]
static PLAIN_FILENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|[;\s])filename\s*=\s*("[^"]*"|[^;]*)"#)
        .expect("filename regex is valid") // Static pattern, safe to panic
});

/// Parses a Content-Disposition header to extract the filename.
///
/// Handles:
/// - `attachment; filename="example.xlsx"`
/// - `attachment; fileName=%E6%8A%A5%E8%A1%A8.xlsx` (percent-encoded)
/// - `attachment; filename*=UTF-8''example.xlsx` (RFC 5987)
///
/// Quotes are stripped and the value is percent-decoded.
pub(crate) fn parse_content_disposition(header: &str) -> Option<String> {
    if let Some(captures) = EXTENDED_FILENAME.captures(header) {
        let value = captures[1].trim();
        let encoded = value.split_once("''").map_or(value, |(_, encoded)| encoded);
        if let Some(name) = clean(encoded) {
            return Some(name);
        }
    }

    PLAIN_FILENAME
        .captures(header)
        .and_then(|captures| clean(&captures[1]))
}

fn clean(raw: &str) -> Option<String> {
    let unquoted = raw.trim().replace('"', "");
    let decoded = urlencoding::decode(&unquoted)
        .map_or_else(|_| unquoted.clone(), std::borrow::Cow::into_owned);
    let decoded = decoded.trim();
    if decoded.is_empty() {
        None
    } else {
        Some(decoded.to_string())
    }
}

/// Picks the name for a saved download.
///
/// Order: Content-Disposition, then the caller's name, then
/// [`DEFAULT_FILENAME`]. Double quotes never survive.
pub(crate) fn choose_filename(content_disposition: Option<&str>, requested: Option<&str>) -> String {
    content_disposition
        .and_then(parse_content_disposition)
        .or_else(|| {
            requested
                .map(|name| name.replace('"', "").trim().to_string())
                .filter(|name| !name.is_empty())
        })
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}

/// Sanitizes filename for filesystem safety.
///
/// Replaces characters that are invalid on common filesystems:
/// / \ : * ? " < > |
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.trim_matches('_').is_empty() {
        return DEFAULT_FILENAME.to_string();
    }

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized.replace('.', "_")
    }
}

/// Resolves a unique file path in `dir`: `name.ext`, then `name_1.ext`, ...
pub(crate) fn resolve_unique_path(dir: &Path, filename: &str) -> PathBuf {
    let filename = sanitize_filename(filename);
    let base_path = dir.join(&filename);
    if !base_path.exists() {
        return base_path;
    }

    let (stem, ext) = match filename.rfind('.') {
        Some(pos) if pos > 0 => (&filename[..pos], &filename[pos..]),
        _ => (filename.as_str(), ""),
    };

    for i in 1..1000 {
        let candidate = dir.join(format!("{stem}_{i}{ext}"));
        if !candidate.exists() {
            return candidate;
        }
    }

    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    dir.join(format!("{stem}_{timestamp}{ext}"))
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}
