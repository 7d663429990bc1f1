//! Interactive decision for unclassified external hosts
//!
//! The policy engine only describes the prompt. Showing it, waiting for the
//! answer and persisting the result is the caller's job; [`resolve_prompt`]
//! computes the effect of the chosen option.

use serde::{Deserialize, Serialize};

use crate::domain_set::DomainSet;

/// One of the three options offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PromptChoice {
    AlwaysBlock,
    Cancel,
    AlwaysAllow,
}

impl PromptChoice {
    pub const ALL: [PromptChoice; 3] = [Self::AlwaysBlock, Self::Cancel, Self::AlwaysAllow];

    /// Button label shown by the shell.
    pub fn label(self) -> &'static str {
        match self {
            Self::AlwaysBlock => "Always Block",
            Self::Cancel => "Cancel",
            Self::AlwaysAllow => "Always Allow",
        }
    }

    /// Parse a choice from loose user input.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "alwaysblock" | "block" => Some(Self::AlwaysBlock),
            "cancel" => Some(Self::Cancel),
            "alwaysallow" | "allow" => Some(Self::AlwaysAllow),
            _ => None,
        }
    }
}

/// A pending decision about one external host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    /// Host the user is asked about.
    pub host: String,
    /// URL loaded when the user picks Always Allow.
    pub url: String,
}

impl Prompt {
    /// Options offered, in display order.
    pub fn choices(&self) -> [PromptChoice; 3] {
        PromptChoice::ALL
    }

    /// Message body shown above the options.
    pub fn message(&self) -> String {
        format!(
            "External domain: {}\n\nWould you like to always allow or permanently block this site?",
            self.host
        )
    }
}

/// Build a prompt for `host`, unless the host is already blocked.
pub fn offer_prompt(host: &str, url: &str, blocked: &DomainSet) -> Option<Prompt> {
    if host.is_empty() || blocked.contains(host) {
        return None;
    }
    Some(Prompt {
        host: host.to_string(),
        url: url.to_string(),
    })
}

/// Effect of a resolved prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptOutcome {
    /// A domain set was modified and should be persisted.
    pub changed: bool,
    /// URL the shell should now load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigate_to: Option<String>,
}

/// Apply the user's choice to the allow/block sets.
pub fn resolve_prompt(
    prompt: &Prompt,
    choice: PromptChoice,
    allowed: &mut DomainSet,
    blocked: &mut DomainSet,
) -> PromptOutcome {
    match choice {
        PromptChoice::AlwaysBlock => PromptOutcome {
            changed: blocked.insert(&prompt.host),
            navigate_to: None,
        },
        PromptChoice::Cancel => PromptOutcome::default(),
        PromptChoice::AlwaysAllow => PromptOutcome {
            changed: allowed.insert(&prompt.host),
            navigate_to: Some(prompt.url.clone()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt() -> Prompt {
        Prompt {
            host: "b.com".to_string(),
            url: "https://b.com/page".to_string(),
        }
    }

    #[test]
    fn test_no_prompt_for_blocked_host() {
        let blocked = DomainSet::from(vec!["b.com".to_string()]);
        assert_eq!(offer_prompt("b.com", "https://b.com", &blocked), None);
        assert!(offer_prompt("c.com", "https://c.com", &blocked).is_some());
    }

    #[test]
    fn test_always_block() {
        let (mut allowed, mut blocked) = (DomainSet::new(), DomainSet::new());
        let outcome = resolve_prompt(&prompt(), PromptChoice::AlwaysBlock, &mut allowed, &mut blocked);
        assert!(outcome.changed);
        assert_eq!(outcome.navigate_to, None);
        assert!(blocked.contains("b.com"));
        assert!(allowed.is_empty());
    }

    #[test]
    fn test_cancel_changes_nothing() {
        let (mut allowed, mut blocked) = (DomainSet::new(), DomainSet::new());
        let outcome = resolve_prompt(&prompt(), PromptChoice::Cancel, &mut allowed, &mut blocked);
        assert_eq!(outcome, PromptOutcome::default());
        assert!(allowed.is_empty() && blocked.is_empty());
    }

    #[test]
    fn test_always_allow_navigates() {
        let (mut allowed, mut blocked) = (DomainSet::new(), DomainSet::new());
        let outcome = resolve_prompt(&prompt(), PromptChoice::AlwaysAllow, &mut allowed, &mut blocked);
        assert!(outcome.changed);
        assert_eq!(outcome.navigate_to.as_deref(), Some("https://b.com/page"));
        assert!(allowed.contains("b.com"));
    }

    #[test]
    fn test_choice_parsing_and_order() {
        assert_eq!(PromptChoice::parse("Always Block"), Some(PromptChoice::AlwaysBlock));
        assert_eq!(PromptChoice::parse("always-allow"), Some(PromptChoice::AlwaysAllow));
        assert_eq!(PromptChoice::parse("cancel"), Some(PromptChoice::Cancel));
        assert_eq!(PromptChoice::parse("maybe"), None);
        let labels: Vec<_> = prompt().choices().iter().map(|c| c.label()).collect();
        assert_eq!(labels, ["Always Block", "Cancel", "Always Allow"]);
    }
}
