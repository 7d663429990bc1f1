//! Remote filter list provider
//!
//! Serves the merged blocklist from the persistent cache while it is fresh,
//! otherwise downloads the remote hosts list, merges it with the built-in
//! list and writes both the list and its timestamp back to the store.
//! Network and parse failures never surface to the caller: the built-in list
//! is returned and the existing cache is left as it was.

use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::{debug, info, warn};
use ns_core::store::{get_json, keys, set_json};
use ns_core::{Blocklist, KeyValueStore, StoreError};

use crate::baseline::{baseline, DEFAULT_SOURCE_URL};
use crate::merge::{merge_with_baseline, MergeStats};
use crate::parser::parse_hosts_list;

/// Cached lists younger than this are served without a network request.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Upper bound on a single download.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Error type for list downloads.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unexpected status {0}")]
    Status(u16),
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Source returned no usable entries")]
    Empty,
}

/// Source of raw list text.
pub trait ListFetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// [`ListFetcher`] backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("navshield/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl ListFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }
        Ok(response.text().await?)
    }
}

// =============================================================================
// Provider
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub source_url: String,
    pub ttl: Duration,
    pub timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            ttl: DEFAULT_TTL,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Where a returned list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSource {
    /// Fresh cache, no request made.
    Cache,
    /// Downloaded and merged just now.
    Remote(MergeStats),
    /// Download failed; built-in list served.
    Builtin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterLists {
    pub blocklist: Blocklist,
    pub source: ListSource,
}

pub struct FilterListProvider<F> {
    fetcher: F,
    config: ProviderConfig,
}

impl FilterListProvider<HttpFetcher> {
    /// Provider using the network with the given settings.
    pub fn http(config: ProviderConfig) -> Result<Self, FetchError> {
        let fetcher = HttpFetcher::new(config.timeout)?;
        Ok(Self::new(fetcher, config))
    }
}

impl<F: ListFetcher> FilterListProvider<F> {
    pub fn new(fetcher: F, config: ProviderConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Return the effective blocklist, refreshing it if stale or `force`d.
    pub async fn fetch_filter_lists<S>(&self, store: &mut S, force: bool) -> FilterLists
    where
        S: KeyValueStore + ?Sized,
    {
        self.fetch_filter_lists_at(store, force, now_millis()).await
    }

    /// Like [`fetch_filter_lists`](Self::fetch_filter_lists) with an explicit
    /// clock, in milliseconds since the Unix epoch.
    pub async fn fetch_filter_lists_at<S>(&self, store: &mut S, force: bool, now_ms: u64) -> FilterLists
    where
        S: KeyValueStore + ?Sized,
    {
        if !force {
            if let (Some(list), Some(updated)) = (read_cache(&*store), last_update(&*store)) {
                let age = now_ms.saturating_sub(updated);
                if u128::from(age) < self.config.ttl.as_millis() {
                    debug!("Serving cached filter list ({} entries, age {} ms)", list.len(), age);
                    return FilterLists {
                        blocklist: list,
                        source: ListSource::Cache,
                    };
                }
            }
        }

        match self.download().await {
            Ok(domains) => {
                let (blocklist, stats) = merge_with_baseline(domains);
                info!(
                    "Fetched {} domains from {} ({} merged, {} duplicates)",
                    stats.fetched, self.config.source_url, stats.merged, stats.duplicates
                );
                write_cache(store, &blocklist, now_ms);
                FilterLists {
                    blocklist,
                    source: ListSource::Remote(stats),
                }
            }
            Err(e) => {
                warn!("Failed to refresh filter list from {}: {}", self.config.source_url, e);
                FilterLists {
                    blocklist: baseline(),
                    source: ListSource::Builtin,
                }
            }
        }
    }

    async fn download(&self) -> Result<Vec<String>, FetchError> {
        let fetch = self.fetcher.fetch(&self.config.source_url);
        let text = tokio::time::timeout(self.config.timeout, fetch)
            .await
            .map_err(|_| FetchError::Timeout(self.config.timeout))??;

        let domains = parse_hosts_list(&text);
        if domains.is_empty() {
            return Err(FetchError::Empty);
        }
        Ok(domains)
    }
}

/// Cached merged list, if present and readable.
pub fn read_cache<S: KeyValueStore + ?Sized>(store: &S) -> Option<Blocklist> {
    match get_json::<Vec<String>, _>(store, keys::FILTERS_CACHE) {
        Ok(Some(domains)) if !domains.is_empty() => Some(Blocklist::from(domains)),
        Ok(_) => None,
        Err(e) => {
            warn!("Ignoring unreadable filter cache: {}", e);
            None
        }
    }
}

/// Timestamp of the last successful refresh, in milliseconds.
///
/// Unreadable or malformed values are logged and treated as missing.
pub fn last_update<S: KeyValueStore + ?Sized>(store: &S) -> Option<u64> {
    match stored_timestamp(store) {
        Ok(updated) => updated,
        Err(e) => {
            warn!("Ignoring filter timestamp: {}", e);
            None
        }
    }
}

fn stored_timestamp<S: KeyValueStore + ?Sized>(store: &S) -> Result<Option<u64>, StoreError> {
    let Some(raw) = store.get(keys::FILTERS_LAST_UPDATE)? else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|e: std::num::ParseIntError| StoreError::InvalidValue {
            key: keys::FILTERS_LAST_UPDATE.to_string(),
            reason: format!("'{}' is not a millisecond timestamp: {}", raw, e),
        })
}

fn write_cache<S: KeyValueStore + ?Sized>(store: &mut S, blocklist: &Blocklist, now_ms: u64) {
    // List before timestamp, so a failed list write never looks fresh.
    if let Err(e) = set_json(store, keys::FILTERS_CACHE, blocklist) {
        warn!("Failed to persist filter cache: {}", e);
        return;
    }
    if let Err(e) = store.set(keys::FILTERS_LAST_UPDATE, &now_ms.to_string()) {
        warn!("Failed to persist filter timestamp: {}", e);
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
