//! Domain Matcher
//!
//! One matching routine shared by the user allow/block lists and the
//! ad/tracker blocklist. Allow/block lists use exact matching; the blocklist
//! walks parent domains so a single entry covers all of its subdomains.

use crate::domain::walk_host_suffixes;

/// How a host is tested against a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Host must equal an entry.
    Exact,
    /// Host or any of its parent domains must equal an entry.
    ParentWalk,
}

/// A collection of lowercase hostnames that can be matched against.
pub trait HostSet {
    /// Exact membership of an already-lowercased host.
    fn contains_host(&self, host: &str) -> bool;

    /// All entries, used for the substring fallback on malformed URLs.
    fn hosts(&self) -> &[String];
}

// =============================================================================
// Matcher
// =============================================================================

/// Matches hosts and URLs against a [`HostSet`].
pub struct Matcher<'a, S: HostSet + ?Sized> {
    set: &'a S,
    mode: MatchMode,
}

impl<'a, S: HostSet + ?Sized> Matcher<'a, S> {
    pub fn new(set: &'a S, mode: MatchMode) -> Self {
        Self { set, mode }
    }

    pub fn exact(set: &'a S) -> Self {
        Self::new(set, MatchMode::Exact)
    }

    pub fn parent_walk(set: &'a S) -> Self {
        Self::new(set, MatchMode::ParentWalk)
    }

    /// Test a bare hostname.
    pub fn matches_host(&self, host: &str) -> bool {
        let host = host.trim().to_ascii_lowercase();
        if host.is_empty() {
            return false;
        }

        match self.mode {
            MatchMode::Exact => self.set.contains_host(&host),
            MatchMode::ParentWalk => {
                walk_host_suffixes(&host).any(|suffix| self.set.contains_host(suffix))
            }
        }
    }

    /// Test the host of a URL.
    ///
    /// Unparseable URLs never match in exact mode. In parent-walk mode they
    /// fall back to a substring check of every entry against the raw URL.
    /// URLs that parse but carry no host never match.
    pub fn matches_url(&self, url: &str) -> bool {
        if url.is_empty() {
            return false;
        }

        match ::url::Url::parse(url) {
            Ok(parsed) => match parsed.host_str() {
                Some(host) if !host.is_empty() => self.matches_host(host),
                _ => false,
            },
            Err(_) => match self.mode {
                MatchMode::Exact => false,
                MatchMode::ParentWalk => self
                    .set
                    .hosts()
                    .iter()
                    .any(|entry| !entry.is_empty() && url.contains(entry.as_str())),
            },
        }
    }
}

/// Test a hostname against a set.
pub fn matches<S: HostSet + ?Sized>(host: &str, set: &S, mode: MatchMode) -> bool {
    Matcher::new(set, mode).matches_host(host)
}
