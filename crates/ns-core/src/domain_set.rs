//! User-curated allow / block lists

use serde::{Deserialize, Serialize};

use crate::domain::normalize_domain;
use crate::matcher::HostSet;

/// Ordered, deduplicated list of lowercase hostnames.
///
/// The most recently added host comes first. Serializes as a plain JSON
/// array so stored values stay readable by other tooling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct DomainSet {
    hosts: Vec<String>,
}

impl DomainSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a host at the front. Returns `false` if it was already present.
    pub fn insert(&mut self, host: &str) -> bool {
        let host = host.trim().to_lowercase();
        if host.is_empty() || self.contains(&host) {
            return false;
        }
        self.hosts.insert(0, host);
        true
    }

    /// Normalize free-form user input and insert it.
    ///
    /// Returns the stored host when something was added.
    pub fn insert_normalized(&mut self, input: &str) -> Option<String> {
        let host = normalize_domain(input)?;
        if self.insert(&host) {
            Some(host)
        } else {
            None
        }
    }

    /// Remove a host. Returns `false` if it was not present.
    pub fn remove(&mut self, host: &str) -> bool {
        let host = host.trim().to_lowercase();
        let before = self.hosts.len();
        self.hosts.retain(|h| *h != host);
        self.hosts.len() != before
    }

    /// Exact membership test.
    pub fn contains(&self, host: &str) -> bool {
        self.hosts.iter().any(|h| h.eq_ignore_ascii_case(host))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.hosts.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

impl From<Vec<String>> for DomainSet {
    fn from(hosts: Vec<String>) -> Self {
        let mut set = DomainSet::new();
        // Stored order is already most-recent-first; keep it.
        for host in hosts {
            let host = host.trim().to_lowercase();
            if !host.is_empty() && !set.contains(&host) {
                set.hosts.push(host);
            }
        }
        set
    }
}

impl From<DomainSet> for Vec<String> {
    fn from(set: DomainSet) -> Self {
        set.hosts
    }
}

impl HostSet for DomainSet {
    fn contains_host(&self, host: &str) -> bool {
        self.contains(host)
    }

    fn hosts(&self) -> &[String] {
        &self.hosts
    }
}
