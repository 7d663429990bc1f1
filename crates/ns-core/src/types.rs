//! Shared type definitions for NavShield
//!
//! These types cross the boundary to the host shell (wasm bindings, CLI)
//! and are serialized with camelCase field names for JavaScript callers.

use serde::{Deserialize, Serialize};

use crate::prompt::Prompt;

// =============================================================================
// Filter Config
// =============================================================================

/// Feature toggles read at every navigation and injection point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterConfig {
    /// In-page ad/tracker suppression.
    pub ad_block_enabled: bool,
    /// Gate navigations to hosts outside the current site.
    pub external_block_enabled: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            ad_block_enabled: true,
            external_block_enabled: false,
        }
    }
}

// =============================================================================
// Verdicts
// =============================================================================

/// Which rule of the navigation policy produced a decision.
///
/// Variants are listed in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Verdict {
    /// Intent URL resolved to a web URL the shell should load directly.
    IntentRedirect,
    /// Intent URL resolved to an unclassified external host; prompt raised.
    IntentPrompt,
    /// Intent URL with no usable target, or gated without a prompt.
    IntentSwallowed,
    /// Scheme other than http(s).
    UnsupportedScheme,
    /// Target equals the currently loaded URL.
    CurrentUrl,
    /// Same host as the current page, or host could not be extracted.
    SameHost,
    /// Host is in the allowed set.
    Allowlisted,
    /// Host is in the blocked set.
    Blocklisted,
    /// External blocking is switched off.
    ExternalBlockDisabled,
    /// Unclassified external host; prompt raised.
    ExternalPrompt,
}

impl Verdict {
    /// Stable identifier, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IntentRedirect => "intentRedirect",
            Self::IntentPrompt => "intentPrompt",
            Self::IntentSwallowed => "intentSwallowed",
            Self::UnsupportedScheme => "unsupportedScheme",
            Self::CurrentUrl => "currentUrl",
            Self::SameHost => "sameHost",
            Self::Allowlisted => "allowlisted",
            Self::Blocklisted => "blocklisted",
            Self::ExternalBlockDisabled => "externalBlockDisabled",
            Self::ExternalPrompt => "externalPrompt",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Navigation Decision
// =============================================================================

/// Outcome of one navigation-intercept callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationDecision {
    /// Whether the web surface should proceed with the request as-is.
    pub allow: bool,
    pub verdict: Verdict,
    /// Interactive choice to present, resolved later by the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<Prompt>,
    /// URL the shell should load itself (intent redirects).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigate_to: Option<String>,
}

impl NavigationDecision {
    pub(crate) fn allow(verdict: Verdict) -> Self {
        Self {
            allow: true,
            verdict,
            prompt: None,
            navigate_to: None,
        }
    }

    pub(crate) fn deny(verdict: Verdict) -> Self {
        Self {
            allow: false,
            verdict,
            prompt: None,
            navigate_to: None,
        }
    }

    pub(crate) fn redirect(url: String) -> Self {
        Self {
            navigate_to: Some(url),
            ..Self::deny(Verdict::IntentRedirect)
        }
    }

    pub(crate) fn prompt(verdict: Verdict, prompt: Prompt) -> Self {
        Self {
            prompt: Some(prompt),
            ..Self::deny(verdict)
        }
    }

    /// Host the caller should ask the user about, if any.
    pub fn prompt_for_host(&self) -> Option<&str> {
        self.prompt.as_ref().map(|p| p.host.as_str())
    }
}
