//! Hostname utilities: parent-domain walking and user input normalization
//!
//! # Examples
//!
//! ```
//! use ns_core::domain::walk_host_suffixes;
//!
//! let suffixes: Vec<&str> = walk_host_suffixes("a.b.example.com").collect();
//! assert_eq!(suffixes, ["a.b.example.com", "b.example.com", "example.com", "com"]);
//! ```

/// Get the parent domain (strip leftmost label).
pub fn get_parent_domain(host: &str) -> Option<&str> {
    match host.find('.') {
        Some(idx) if idx < host.len() - 1 => Some(&host[idx + 1..]),
        _ => None,
    }
}

/// Iterator over a host and each of its parent domains, most specific first.
pub struct HostSuffixIter<'a> {
    current: Option<&'a str>,
}

impl<'a> HostSuffixIter<'a> {
    pub fn new(host: &'a str) -> Self {
        let host = host.trim_end_matches('.');
        Self {
            current: if host.is_empty() { None } else { Some(host) },
        }
    }
}

impl<'a> Iterator for HostSuffixIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.current?;
        self.current = get_parent_domain(result);
        Some(result)
    }
}

/// Walk host suffixes from most specific to least specific, ending at the
/// top-level label.
pub fn walk_host_suffixes(host: &str) -> HostSuffixIter<'_> {
    HostSuffixIter::new(host)
}

/// Normalize a domain typed by a user into the form stored in a domain set.
///
/// Lowercases, trims, strips a leading `http://` / `https://` and drops
/// everything from the first `/`. Returns `None` when nothing is left.
pub fn normalize_domain(input: &str) -> Option<String> {
    let lowered = input.trim().to_lowercase();
    let without_scheme = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered);
    let host = without_scheme.split('/').next().unwrap_or("").trim();

    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_parent_domain() {
        assert_eq!(get_parent_domain("sub.example.com"), Some("example.com"));
        assert_eq!(get_parent_domain("example.com"), Some("com"));
        assert_eq!(get_parent_domain("com"), None);
        assert_eq!(get_parent_domain("com."), None);
        assert_eq!(get_parent_domain(""), None);
    }

    #[test]
    fn test_walk_suffixes() {
        let walked: Vec<&str> = walk_host_suffixes("sub.ads.example.com").collect();
        assert_eq!(walked, ["sub.ads.example.com", "ads.example.com", "example.com", "com"]);

        let walked: Vec<&str> = walk_host_suffixes("localhost").collect();
        assert_eq!(walked, ["localhost"]);

        assert_eq!(walk_host_suffixes("").count(), 0);
    }

    #[test]
    fn test_walk_ignores_trailing_dot() {
        let walked: Vec<&str> = walk_host_suffixes("example.com.").collect();
        assert_eq!(walked, ["example.com", "com"]);
    }

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain("  Example.COM "), Some("example.com".to_string()));
        assert_eq!(normalize_domain("https://ads.example.com/path?q"), Some("ads.example.com".to_string()));
        assert_eq!(normalize_domain("http://example.org"), Some("example.org".to_string()));
        assert_eq!(normalize_domain("example.net/page"), Some("example.net".to_string()));
        assert_eq!(normalize_domain("   "), None);
        assert_eq!(normalize_domain("https:///nothing"), None);
    }
}
