//! NavShield Filter Lists
//!
//! This crate turns hosts-format ad server lists into a [`Blocklist`],
//! keeps a cached copy fresh through a [`KeyValueStore`], and builds the
//! content filter program injected into every page.
//!
//! [`Blocklist`]: ns_core::Blocklist
//! [`KeyValueStore`]: ns_core::KeyValueStore

pub mod baseline;
pub mod inject;
pub mod merge;
pub mod parser;
#[cfg(feature = "fetch")]
pub mod provider;

pub use baseline::{baseline, BUILTIN_BLOCKLIST, DEFAULT_SOURCE_URL};
pub use inject::{build_injection, InjectionConfig};
pub use merge::{merge_with_baseline, MergeStats};
pub use parser::parse_hosts_list;
#[cfg(feature = "fetch")]
pub use provider::{
    FetchError, FilterListProvider, FilterLists, HttpFetcher, ListFetcher, ListSource, ProviderConfig,
};
