use std::time::Duration;
use url::Url;

/// Link schemes that never point at a resource page
const REJECTED_PREFIXES: [&str; 4] = ["javascript:", "mailto:", "tel:", "#"];

/// Resolve `href` against the page it appeared on.
///
/// Returns `None` for empty, in-page or non-http(s) links.
pub fn absolute_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if REJECTED_PREFIXES.iter().any(|p| lowered.starts_with(p)) {
        return None;
    }

    let resolved = base.join(href).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}

/// Milliseconds in `elapsed`, saturating
pub fn as_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
