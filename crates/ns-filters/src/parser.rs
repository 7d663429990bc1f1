//! Hosts-file list parsing
//!
//! Only `127.0.0.1 <domain>` lines contribute; everything else (comments,
//! `0.0.0.0` entries, headers, HTML error pages) is skipped.

/// Prefix a line must start with to be considered.
pub const HOSTS_SENTINEL: &str = "127.0.0.1";

/// Entries this short or shorter are discarded.
const MIN_DOMAIN_LEN: usize = 3;

/// Parse a hosts-format document into domains, in document order.
pub fn parse_hosts_list(text: &str) -> Vec<String> {
    text.lines().filter_map(parse_hosts_line).collect()
}

/// Extract the domain from a single hosts line.
pub fn parse_hosts_line(line: &str) -> Option<String> {
    if !line.starts_with(HOSTS_SENTINEL) {
        return None;
    }

    let domain = line.split_whitespace().nth(1)?.trim();
    if domain.len() <= MIN_DOMAIN_LEN {
        return None;
    }

    Some(domain.to_string())
}
