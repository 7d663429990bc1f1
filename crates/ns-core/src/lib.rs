//! NavShield Core Library
//!
//! This crate provides the decision logic of the NavShield browser shell:
//! which navigations the embedded web view may perform, and which hosts the
//! in-page content filter suppresses.
//!
//! # Architecture
//!
//! Everything here is synchronous and side-effect free apart from the
//! [`store`] module. The host rendering surface calls
//! [`policy::decide_navigation`] from its navigation-intercept hook and acts
//! on the returned [`NavigationDecision`]; prompts are described, not shown.
//!
//! # Modules
//!
//! - `domain`: Parent-domain walking and user input normalization
//! - `domain_set`: Ordered allow/block lists
//! - `blocklist`: Ad/tracker blocklist
//! - `matcher`: Exact and parent-walk host matching
//! - `url`: Scheme checks, hostname and intent target extraction
//! - `policy`: Navigation policy engine
//! - `prompt`: Always Block / Cancel / Always Allow model
//! - `store`: Key-value persistence
//! - `state`: Persisted browser shell state
//! - `types`: Shared type definitions

pub mod blocklist;
pub mod domain;
pub mod domain_set;
pub mod matcher;
pub mod policy;
pub mod prompt;
pub mod state;
pub mod store;
pub mod types;
pub mod url;

// Re-export commonly used types
pub use blocklist::Blocklist;
pub use domain_set::DomainSet;
pub use matcher::{matches, HostSet, MatchMode, Matcher};
pub use policy::{decide_navigation, NavigationPolicy, NavigationRequest, PolicyContext};
pub use prompt::{offer_prompt, resolve_prompt, Prompt, PromptChoice, PromptOutcome};
pub use state::{BrowserState, ListKind};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use types::{FilterConfig, NavigationDecision, Verdict};
