//! Navigation Policy Engine
//!
//! Runs synchronously inside the web surface's "should this navigation
//! proceed" callback. Rules are evaluated in a fixed order and the first one
//! that applies decides:
//!
//! 1. `intent:` URLs are never handed to the web surface. A web URL found
//!    inside is either loaded directly by the shell or gated by a prompt.
//! 2. Non-http(s) schemes are denied.
//! 3. The currently loaded URL is allowed (reloads, resubmissions).
//! 4. Same host, or no extractable host, is allowed.
//! 5. Allowed set: allow. Checked before the blocked set, so allow wins.
//! 6. Blocked set: deny without a prompt.
//! 7. External blocking disabled: allow.
//! 8. Otherwise deny and raise a prompt.

use log::debug;

use crate::domain_set::DomainSet;
use crate::matcher::Matcher;
use crate::prompt::offer_prompt;
use crate::types::{FilterConfig, NavigationDecision, Verdict};
use crate::url::{extract_intent_target, hostname, scheme_kind, SchemeKind};

/// Everything the engine reads for one decision.
#[derive(Debug, Clone, Copy)]
pub struct PolicyContext<'a> {
    /// URL currently loaded by the web surface.
    pub current_url: &'a str,
    pub config: FilterConfig,
    pub allowed: &'a DomainSet,
    pub blocked: &'a DomainSet,
}

/// A prospective load intercepted from the web surface.
#[derive(Debug, Clone, Copy)]
pub struct NavigationRequest<'a> {
    pub url: &'a str,
}

impl<'a> NavigationRequest<'a> {
    pub fn new(url: &'a str) -> Self {
        Self { url }
    }
}

/// The navigation policy engine.
pub struct NavigationPolicy<'a> {
    ctx: PolicyContext<'a>,
}

impl<'a> NavigationPolicy<'a> {
    pub fn new(ctx: PolicyContext<'a>) -> Self {
        Self { ctx }
    }

    /// Decide whether `request` may proceed.
    pub fn decide(&self, request: &NavigationRequest<'_>) -> NavigationDecision {
        let url = request.url;

        let decision = match scheme_kind(url) {
            SchemeKind::Intent => self.decide_intent(url),
            SchemeKind::Other => NavigationDecision::deny(Verdict::UnsupportedScheme),
            SchemeKind::Web => self.decide_web(url),
        };

        debug!(
            "navigation {} -> {:?} (allow={})",
            url, decision.verdict, decision.allow
        );
        decision
    }

    fn decide_web(&self, url: &str) -> NavigationDecision {
        if url == self.ctx.current_url {
            return NavigationDecision::allow(Verdict::CurrentUrl);
        }

        let target_host = match hostname(url) {
            Some(host) => host,
            None => return NavigationDecision::allow(Verdict::SameHost),
        };
        if Some(target_host.as_str()) == self.current_host().as_deref() {
            return NavigationDecision::allow(Verdict::SameHost);
        }

        if self.is_allowed(&target_host) {
            return NavigationDecision::allow(Verdict::Allowlisted);
        }
        if self.is_blocked(&target_host) {
            return NavigationDecision::deny(Verdict::Blocklisted);
        }
        if !self.ctx.config.external_block_enabled {
            return NavigationDecision::allow(Verdict::ExternalBlockDisabled);
        }

        match offer_prompt(&target_host, url, self.ctx.blocked) {
            Some(prompt) => NavigationDecision::prompt(Verdict::ExternalPrompt, prompt),
            None => NavigationDecision::deny(Verdict::Blocklisted),
        }
    }

    fn decide_intent(&self, intent: &str) -> NavigationDecision {
        let target = match extract_intent_target(intent) {
            Some(target) => target,
            None => return NavigationDecision::deny(Verdict::IntentSwallowed),
        };

        let target_host = hostname(&target);
        let trusted = match target_host.as_deref() {
            Some(host) => {
                Some(host) == self.current_host().as_deref() || self.is_allowed(host)
            }
            None => false,
        };

        if trusted || !self.ctx.config.external_block_enabled {
            return NavigationDecision::redirect(target);
        }

        let prompt = target_host
            .as_deref()
            .and_then(|host| offer_prompt(host, &target, self.ctx.blocked));
        match prompt {
            Some(prompt) => NavigationDecision::prompt(Verdict::IntentPrompt, prompt),
            None => NavigationDecision::deny(Verdict::IntentSwallowed),
        }
    }

    fn current_host(&self) -> Option<String> {
        hostname(self.ctx.current_url)
    }

    fn is_allowed(&self, host: &str) -> bool {
        Matcher::exact(self.ctx.allowed).matches_host(host)
    }

    fn is_blocked(&self, host: &str) -> bool {
        Matcher::exact(self.ctx.blocked).matches_host(host)
    }
}

/// Decide a single navigation.
pub fn decide_navigation(url: &str, ctx: PolicyContext<'_>) -> NavigationDecision {
    NavigationPolicy::new(ctx).decide(&NavigationRequest::new(url))
}
