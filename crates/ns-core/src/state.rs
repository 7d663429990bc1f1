//! Persisted browser shell state
//!
//! Loads the current URL, filter toggles and allow/block lists from a
//! [`KeyValueStore`] and writes every mutation straight back. Storage
//! failures are logged and the in-memory value stays authoritative for
//! the rest of the session.

use log::warn;
use serde::de::DeserializeOwned;

use crate::domain_set::DomainSet;
use crate::policy::{decide_navigation, PolicyContext};
use crate::prompt::{resolve_prompt, Prompt, PromptChoice, PromptOutcome};
use crate::store::{get_json, keys, set_json, KeyValueStore};
use crate::types::{FilterConfig, NavigationDecision};

/// Page loaded when nothing has been stored yet.
pub const DEFAULT_URL: &str = "https://movies-react.vercel.app";

/// Keys cleared by [`BrowserState::reset`].
const RESET_KEYS: [&str; 4] = [
    keys::EXTERNAL_BLOCK_ENABLED,
    keys::AD_BLOCK_ENABLED,
    keys::ALLOWED_DOMAINS,
    keys::BLOCKED_DOMAINS,
];

/// Which user list an edit applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Allowed,
    Blocked,
}

impl ListKind {
    fn key(self) -> &'static str {
        match self {
            Self::Allowed => keys::ALLOWED_DOMAINS,
            Self::Blocked => keys::BLOCKED_DOMAINS,
        }
    }
}

/// Everything the navigation policy reads, as persisted between sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserState {
    pub current_url: String,
    pub config: FilterConfig,
    pub allowed: DomainSet,
    pub blocked: DomainSet,
}

impl Default for BrowserState {
    fn default() -> Self {
        Self {
            current_url: DEFAULT_URL.to_string(),
            config: FilterConfig::default(),
            allowed: DomainSet::new(),
            blocked: DomainSet::new(),
        }
    }
}

impl BrowserState {
    /// Load state, falling back to defaults for anything missing or unreadable.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let defaults = Self::default();

        let current_url = match store.get(keys::CURRENT_URL) {
            Ok(Some(url)) if !url.is_empty() => url,
            Ok(_) => defaults.current_url,
            Err(e) => {
                warn!("Failed to read {}: {}", keys::CURRENT_URL, e);
                defaults.current_url
            }
        };

        Self {
            current_url,
            config: FilterConfig {
                ad_block_enabled: load_or(store, keys::AD_BLOCK_ENABLED, defaults.config.ad_block_enabled),
                external_block_enabled: load_or(
                    store,
                    keys::EXTERNAL_BLOCK_ENABLED,
                    defaults.config.external_block_enabled,
                ),
            },
            allowed: load_or(store, keys::ALLOWED_DOMAINS, defaults.allowed),
            blocked: load_or(store, keys::BLOCKED_DOMAINS, defaults.blocked),
        }
    }

    /// Borrow the state as a policy context.
    pub fn policy_context(&self) -> PolicyContext<'_> {
        PolicyContext {
            current_url: &self.current_url,
            config: self.config,
            allowed: &self.allowed,
            blocked: &self.blocked,
        }
    }

    /// Run the navigation policy against this state.
    pub fn decide(&self, url: &str) -> NavigationDecision {
        decide_navigation(url, self.policy_context())
    }

    pub fn set_current_url<S: KeyValueStore + ?Sized>(&mut self, store: &mut S, url: &str) {
        self.current_url = url.to_string();
        persist(store.set(keys::CURRENT_URL, url), keys::CURRENT_URL);
    }

    pub fn set_ad_block_enabled<S: KeyValueStore + ?Sized>(&mut self, store: &mut S, enabled: bool) {
        self.config.ad_block_enabled = enabled;
        persist(set_json(store, keys::AD_BLOCK_ENABLED, &enabled), keys::AD_BLOCK_ENABLED);
    }

    pub fn set_external_block_enabled<S: KeyValueStore + ?Sized>(&mut self, store: &mut S, enabled: bool) {
        self.config.external_block_enabled = enabled;
        persist(
            set_json(store, keys::EXTERNAL_BLOCK_ENABLED, &enabled),
            keys::EXTERNAL_BLOCK_ENABLED,
        );
    }

    pub fn list(&self, kind: ListKind) -> &DomainSet {
        match kind {
            ListKind::Allowed => &self.allowed,
            ListKind::Blocked => &self.blocked,
        }
    }

    fn list_mut(&mut self, kind: ListKind) -> &mut DomainSet {
        match kind {
            ListKind::Allowed => &mut self.allowed,
            ListKind::Blocked => &mut self.blocked,
        }
    }

    /// Normalize user input and add it to a list. Returns the stored host.
    pub fn add_domain<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
        kind: ListKind,
        input: &str,
    ) -> Option<String> {
        let added = self.list_mut(kind).insert_normalized(input)?;
        self.save_list(store, kind);
        Some(added)
    }

    /// Remove a host from a list. Returns `false` if it was not present.
    pub fn remove_domain<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
        kind: ListKind,
        host: &str,
    ) -> bool {
        if !self.list_mut(kind).remove(host) {
            return false;
        }
        self.save_list(store, kind);
        true
    }

    /// Apply the user's answer to a prompt, persisting list changes and the
    /// new current URL when the answer navigates.
    pub fn apply_choice<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
        prompt: &Prompt,
        choice: PromptChoice,
    ) -> PromptOutcome {
        let outcome = resolve_prompt(prompt, choice, &mut self.allowed, &mut self.blocked);

        if outcome.changed {
            let kind = match choice {
                PromptChoice::AlwaysAllow => ListKind::Allowed,
                _ => ListKind::Blocked,
            };
            self.save_list(store, kind);
        }
        if let Some(url) = outcome.navigate_to.as_deref() {
            self.set_current_url(store, url);
        }

        outcome
    }

    /// Forget the filter toggles and both domain lists, restoring defaults.
    /// The current URL is kept.
    pub fn reset<S: KeyValueStore + ?Sized>(&mut self, store: &mut S) {
        for key in RESET_KEYS {
            persist(store.remove(key), key);
        }

        let defaults = Self::default();
        self.config = defaults.config;
        self.allowed = defaults.allowed;
        self.blocked = defaults.blocked;
    }

    fn save_list<S: KeyValueStore + ?Sized>(&self, store: &mut S, kind: ListKind) {
        persist(set_json(store, kind.key(), self.list(kind)), kind.key());
    }
}

fn load_or<T, S>(store: &S, key: &str, default: T) -> T
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match get_json(store, key) {
        Ok(Some(value)) => value,
        Ok(None) => default,
        Err(e) => {
            warn!("Failed to read {}: {}", key, e);
            default
        }
    }
}

fn persist<E: std::fmt::Display>(result: Result<(), E>, key: &str) {
    if let Err(e) = result {
        warn!("Failed to persist {}: {}", key, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreError};
    use crate::types::Verdict;

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::InvalidValue {
                key: key.to_string(),
                reason: "unavailable".to_string(),
            })
        }

        fn set(&mut self, key: &str, _value: &str) -> Result<(), StoreError> {
            self.get(key).map(|_| ())
        }

        fn remove(&mut self, key: &str) -> Result<(), StoreError> {
            self.get(key).map(|_| ())
        }
    }

    #[test]
    fn test_defaults_on_empty_store() {
        let state = BrowserState::load(&MemoryStore::new());
        assert_eq!(state, BrowserState::default());
        assert_eq!(state.current_url, DEFAULT_URL);
        assert!(state.config.ad_block_enabled);
        assert!(!state.config.external_block_enabled);
    }

    #[test]
    fn test_round_trip_through_store() {
        let mut store = MemoryStore::new();
        let mut state = BrowserState::load(&store);
        state.set_current_url(&mut store, "https://a.com");
        state.set_external_block_enabled(&mut store, true);
        state.set_ad_block_enabled(&mut store, false);
        state.add_domain(&mut store, ListKind::Allowed, "https://Good.com/x");
        state.add_domain(&mut store, ListKind::Blocked, "bad.com");

        assert_eq!(store.get(keys::EXTERNAL_BLOCK_ENABLED).unwrap().as_deref(), Some("true"));
        assert_eq!(store.get(keys::ALLOWED_DOMAINS).unwrap().as_deref(), Some(r#"["good.com"]"#));

        let reloaded = BrowserState::load(&store);
        assert_eq!(reloaded, state);
    }

    #[test]
    fn test_corrupt_values_fall_back() {
        let mut store = MemoryStore::new();
        store.set(keys::AD_BLOCK_ENABLED, "maybe").unwrap();
        store.set(keys::BLOCKED_DOMAINS, "{").unwrap();
        let state = BrowserState::load(&store);
        assert!(state.config.ad_block_enabled);
        assert!(state.blocked.is_empty());
    }

    #[test]
    fn test_failing_store_keeps_in_memory_state() {
        let mut store = FailingStore;
        let mut state = BrowserState::load(&store);
        assert_eq!(state, BrowserState::default());

        state.add_domain(&mut store, ListKind::Blocked, "b.com");
        assert!(state.blocked.contains("b.com"));
        assert_eq!(state.decide("https://b.com").verdict, Verdict::Blocklisted);
    }

    #[test]
    fn test_prompt_flow_is_silent_after_always_block() {
        let mut store = MemoryStore::new();
        let mut state = BrowserState::load(&store);
        state.set_current_url(&mut store, "https://a.com");
        state.set_external_block_enabled(&mut store, true);

        let decision = state.decide("https://b.com/page");
        let prompt = decision.prompt.expect("prompt expected");
        let outcome = state.apply_choice(&mut store, &prompt, PromptChoice::AlwaysBlock);
        assert!(outcome.changed);

        let again = BrowserState::load(&store).decide("https://b.com/page");
        assert!(!again.allow);
        assert_eq!(again.prompt, None);
        assert_eq!(again.verdict, Verdict::Blocklisted);
    }

    #[test]
    fn test_always_allow_navigates_and_persists() {
        let mut store = MemoryStore::new();
        let mut state = BrowserState::load(&store);
        state.set_current_url(&mut store, "https://a.com");
        state.set_external_block_enabled(&mut store, true);

        let prompt = state.decide("https://b.com/page").prompt.unwrap();
        let outcome = state.apply_choice(&mut store, &prompt, PromptChoice::AlwaysAllow);
        assert_eq!(outcome.navigate_to.as_deref(), Some("https://b.com/page"));

        let reloaded = BrowserState::load(&store);
        assert_eq!(reloaded.current_url, "https://b.com/page");
        assert!(reloaded.allowed.contains("b.com"));
        assert!(reloaded.decide("https://b.com/other").allow);
    }

    #[test]
    fn test_reset_restores_defaults_and_keeps_current_url() {
        let mut store = MemoryStore::new();
        let mut state = BrowserState::load(&store);
        state.set_current_url(&mut store, "https://a.com/page");
        state.set_external_block_enabled(&mut store, true);
        state.set_ad_block_enabled(&mut store, false);
        state.add_domain(&mut store, ListKind::Allowed, "good.com");
        state.add_domain(&mut store, ListKind::Blocked, "bad.com");
        store.set(keys::FILTERS_CACHE, r#"["ads.example.com"]"#).unwrap();

        state.reset(&mut store);

        for key in RESET_KEYS {
            assert_eq!(store.get(key).unwrap(), None, "{}", key);
        }
        assert!(store.get(keys::FILTERS_CACHE).unwrap().is_some());

        let reloaded = BrowserState::load(&store);
        assert_eq!(reloaded, state);
        assert_eq!(reloaded.current_url, "https://a.com/page");
        assert_eq!(reloaded.config, FilterConfig::default());
        assert!(reloaded.allowed.is_empty() && reloaded.blocked.is_empty());
    }

    #[test]
    fn test_reset_on_failing_store_still_clears_memory() {
        let mut store = FailingStore;
        let mut state = BrowserState::load(&store);
        state.add_domain(&mut store, ListKind::Blocked, "b.com");
        state.reset(&mut store);
        assert!(state.blocked.is_empty());
    }

    #[test]
    fn test_remove_domain() {
        let mut store = MemoryStore::new();
        let mut state = BrowserState::load(&store);
        state.add_domain(&mut store, ListKind::Allowed, "a.com");
        assert!(state.remove_domain(&mut store, ListKind::Allowed, "a.com"));
        assert!(!state.remove_domain(&mut store, ListKind::Allowed, "a.com"));
        assert!(BrowserState::load(&store).allowed.is_empty());
    }
}
