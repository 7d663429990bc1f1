//! URL helpers used on every navigation callback
//!
//! Scheme checks work directly on string slices. Hostname extraction goes
//! through the WHATWG parser so the result matches what the web surface
//! itself reports for `location.hostname`.

use percent_encoding::percent_decode_str;
use url::Url;

// =============================================================================
// Scheme Checks
// =============================================================================

/// Kind of URL scheme as far as navigation policy is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemeKind {
    /// `http://` or `https://`
    Web,
    /// Android `intent:` / `intent://`
    Intent,
    /// Anything else (`mailto:`, `tel:`, custom app schemes, ...)
    Other,
}

/// Classify the scheme of a URL without parsing it.
#[inline]
pub fn scheme_kind(url: &str) -> SchemeKind {
    if is_intent_url(url) {
        SchemeKind::Intent
    } else if is_web_url(url) {
        SchemeKind::Web
    } else {
        SchemeKind::Other
    }
}

/// True for `http://` and `https://` URLs.
#[inline]
pub fn is_web_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// True for `intent:` URLs (which includes `intent://`).
#[inline]
pub fn is_intent_url(url: &str) -> bool {
    url.starts_with("intent:")
}

// =============================================================================
// Host Extraction
// =============================================================================

/// Extract the lowercase hostname of an absolute URL.
///
/// Returns `None` for anything the URL parser rejects and for URLs without
/// a host component.
pub fn hostname(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    if host.is_empty() {
        return None;
    }
    Some(host.to_ascii_lowercase())
}

/// Compare the hosts of two URLs. Two unparseable URLs are equal.
pub fn same_host(a: &str, b: &str) -> bool {
    hostname(a) == hostname(b)
}

// =============================================================================
// Intent Extraction
// =============================================================================

const FALLBACK_PARAM: &str = "S.browser_fallback_url=";

/// Pull a web URL out of an `intent:` URL.
///
/// The `S.browser_fallback_url=` extra wins (percent-decoded) when it is
/// itself an http(s) URL. Otherwise the first embedded `http://` or
/// `https://` URL is taken, ending at the first `;` or `#`.
pub fn extract_intent_target(intent: &str) -> Option<String> {
    let fallback = fallback_param(intent)
        .and_then(|raw| percent_decode_str(raw).decode_utf8().ok())
        .filter(|decoded| is_web_url(decoded));
    if let Some(decoded) = fallback {
        return Some(decoded.into_owned());
    }

    if intent.contains("http") {
        return find_embedded_web_url(intent).map(str::to_string);
    }

    None
}

fn fallback_param(intent: &str) -> Option<&str> {
    let start = intent.find(FALLBACK_PARAM)? + FALLBACK_PARAM.len();
    let rest = &intent[start..];
    let end = rest.find(';').unwrap_or(rest.len());
    let value = &rest[..end];
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn find_embedded_web_url(s: &str) -> Option<&str> {
    let mut offset = 0;
    while let Some(pos) = s[offset..].find("http") {
        let start = offset + pos;
        let after_http = &s[start + 4..];
        let body_start = if after_http.starts_with("s://") {
            Some(start + 8)
        } else if after_http.starts_with("://") {
            Some(start + 7)
        } else {
            None
        };

        if let Some(body_start) = body_start {
            let body = &s[body_start..];
            let len = body.find(|c: char| c == ';' || c == '#').unwrap_or(body.len());
            if len > 0 {
                return Some(&s[start..body_start + len]);
            }
        }

        offset = start + 4;
    }
    None
}
