//! Ad/tracker blocklist used by the in-page content filter

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::matcher::{HostSet, Matcher};

/// Set of hostnames whose requests are suppressed inside loaded pages.
///
/// Keeps first-seen order for serialization and a hash index for lookups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Blocklist {
    entries: Vec<String>,
    index: HashSet<String>,
}

impl Blocklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from any iterator of domains, dropping blanks and duplicates.
    pub fn from_domains<I>(domains: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut list = Self::new();
        list.extend(domains);
        list
    }

    /// Add a domain. Returns `false` for blanks and duplicates.
    pub fn insert(&mut self, domain: String) -> bool {
        let domain = domain.trim().to_string();
        if domain.is_empty() || self.index.contains(&domain) {
            return false;
        }
        self.index.insert(domain.clone());
        self.entries.push(domain);
        true
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.index.contains(domain)
    }

    /// Parent-walk match of a bare hostname.
    pub fn matches_host(&self, host: &str) -> bool {
        Matcher::parent_walk(self).matches_host(host)
    }

    /// Parent-walk match of a request URL, with the substring fallback for
    /// URLs that do not parse.
    pub fn matches_url(&self, url: &str) -> bool {
        Matcher::parent_walk(self).matches_url(url)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Extend<String> for Blocklist {
    fn extend<T: IntoIterator<Item = String>>(&mut self, iter: T) {
        for domain in iter {
            self.insert(domain);
        }
    }
}

impl From<Vec<String>> for Blocklist {
    fn from(domains: Vec<String>) -> Self {
        Self::from_domains(domains)
    }
}

impl From<Blocklist> for Vec<String> {
    fn from(list: Blocklist) -> Self {
        list.entries
    }
}

impl PartialEq for Blocklist {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for Blocklist {}

impl HostSet for Blocklist {
    fn contains_host(&self, host: &str) -> bool {
        self.index.contains(host)
    }

    fn hosts(&self) -> &[String] {
        &self.entries
    }
}
