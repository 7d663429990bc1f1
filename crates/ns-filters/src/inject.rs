//! In-page content filter script
//!
//! [`build_injection`] produces a self-contained JavaScript program that the
//! shell evaluates in every page before page scripts run. The program is
//! idempotent per page (guarded by a window global), rewrites `_blank` links
//! so they stay in the single web surface, and, when ad blocking is on,
//! hides known ad containers and refuses fetch/XHR requests to blocklisted
//! hosts.

use log::info;
use ns_core::Blocklist;

use crate::baseline::baseline;

/// Window global marking a page as already initialized.
pub const INIT_GUARD: &str = "NavShield_AdBlock_Initialized";

/// Message carried by rejected `fetch` promises.
pub const FETCH_BLOCKED_MESSAGE: &str = "Blocked by NavShield";

/// Elements hidden by the cosmetic stylesheet.
pub const COSMETIC_SELECTORS: &[&str] = &[
    r#"[id*="google_ads"]"#,
    r#"[class*="ad-unit"]"#,
    r#"[class*="ad-box"]"#,
    r#"[class*="ad-container"]"#,
    r#"[id^="taboola-"]"#,
    r#"[id^="outbrain-"]"#,
    ".adsbygoogle",
    "ins.adsbygoogle",
    ".ad-sidebar",
    ".ad-banner",
    ".sponsored-content",
    ".promoted-post",
    ".ytp-ad-overlay-container",
    ".ytp-ad-message-container",
    ".video-ads",
    r#"iframe[src*="doubleclick.net"]"#,
    r#"iframe[src*="googlesyndication.com"]"#,
    "#bebi-ads",
    ".bebi-ads-container",
];

/// Dynamically inserted elements matching this are hidden inline.
pub const DYNAMIC_AD_PATTERN: &str = r#"[class*="ad-"], [id*="ad-"]"#;

/// Inputs to the injected program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionConfig {
    pub ad_block_enabled: bool,
    /// Hosts refused in-page. Empty means the built-in list.
    pub blocklist: Blocklist,
}

impl InjectionConfig {
    pub fn new(ad_block_enabled: bool, blocklist: Blocklist) -> Self {
        Self {
            ad_block_enabled,
            blocklist,
        }
    }
}

impl Default for InjectionConfig {
    fn default() -> Self {
        Self::new(true, baseline())
    }
}

/// Build the page-side content filter program.
pub fn build_injection(config: &InjectionConfig) -> String {
    let fallback;
    let blocklist = if config.blocklist.is_empty() {
        fallback = baseline();
        &fallback
    } else {
        &config.blocklist
    };

    info!(
        "Building content filter ({} domains, ad block {})",
        blocklist.len(),
        if config.ad_block_enabled { "on" } else { "off" }
    );

    let domains: Vec<&str> = blocklist.iter().collect();
    // serde_json escapes quotes and control characters, which is enough for a
    // JS array literal.
    let blocklist_json = serde_json::to_string(&domains).unwrap_or_else(|_| "[]".to_string());
    let dynamic_pattern = serde_json::to_string(DYNAMIC_AD_PATTERN).unwrap_or_else(|_| "''".to_string());

    // Blocklist last: its entries are untrusted and must not be rescanned
    // for placeholders.
    SCRIPT_TEMPLATE
        .replace("__NS_GUARD__", INIT_GUARD)
        .replace("__NS_BLOCK_ADS__", if config.ad_block_enabled { "true" } else { "false" })
        .replace("__NS_COSMETIC_CSS__", &cosmetic_css())
        .replace("__NS_DYNAMIC_PATTERN__", &dynamic_pattern)
        .replace("__NS_FETCH_MESSAGE__", FETCH_BLOCKED_MESSAGE)
        .replace("__NS_BLOCKLIST__", &blocklist_json)
}

fn cosmetic_css() -> String {
    format!(
        "{} {{ display: none !important; visibility: hidden !important; opacity: 0 !important; \
         pointer-events: none !important; height: 0 !important; }}",
        COSMETIC_SELECTORS.join(", ")
    )
}

const SCRIPT_TEMPLATE: &str = r#"(function() {
    if (window.__NS_GUARD__) return;
    window.__NS_GUARD__ = true;

    const blockAds = __NS_BLOCK_ADS__;
    const blocklist = __NS_BLOCKLIST__;
    const blockSet = new Set(blocklist);

    // Keep every navigation inside the current surface.
    const retarget = (node) => {
        if (node.tagName === 'A' && node.target === '_blank') {
            node.target = '_self';
        }
        if (node.querySelectorAll) {
            node.querySelectorAll('a[target="_blank"]').forEach((link) => {
                link.target = '_self';
            });
        }
    };
    document.querySelectorAll('a[target="_blank"]').forEach((link) => {
        link.target = '_self';
    });
    new MutationObserver((mutations) => {
        mutations.forEach((mutation) => {
            mutation.addedNodes.forEach((node) => {
                if (node.nodeType === 1) retarget(node);
            });
        });
    }).observe(document.documentElement, { childList: true, subtree: true });

    if (blockAds) {
        const style = document.createElement('style');
        style.textContent = '__NS_COSMETIC_CSS__';
        (document.head || document.documentElement).appendChild(style);
    }

    const isBlacklisted = (url) => {
        if (!blockAds || !url || typeof url !== 'string') return false;
        try {
            const parts = new URL(url).hostname.split('.');
            for (let i = 0; i < parts.length; i++) {
                if (blockSet.has(parts.slice(i).join('.'))) return true;
            }
        } catch (e) {
            return blocklist.some((domain) => url.includes(domain));
        }
        return false;
    };

    const originalFetch = window.fetch;
    window.fetch = function(input, init) {
        const url = (typeof input === 'string') ? input
            : (input instanceof URL) ? input.href
            : (input instanceof Request) ? input.url
            : '';
        if (isBlacklisted(url)) {
            return Promise.reject(new Error('__NS_FETCH_MESSAGE__'));
        }
        return originalFetch.apply(this, arguments);
    };

    const originalOpen = window.XMLHttpRequest.prototype.open;
    window.XMLHttpRequest.prototype.open = function(method, url) {
        const target = (url instanceof URL) ? url.href : url;
        if (isBlacklisted(target)) {
            console.log('NavShield blocked request to: ' + target);
            this.abort();
            return;
        }
        return originalOpen.apply(this, arguments);
    };

    const dynamicPattern = __NS_DYNAMIC_PATTERN__;
    new MutationObserver((mutations) => {
        mutations.forEach((mutation) => {
            mutation.addedNodes.forEach((node) => {
                if (node.nodeType !== 1) return;
                if (node.tagName === 'SCRIPT' && isBlacklisted(node.src)) {
                    node.remove();
                    return;
                }
                if (blockAds && node.matches && node.matches(dynamicPattern)) {
                    node.style.setProperty('display', 'none', 'important');
                }
            });
        });
    }).observe(document.documentElement, { childList: true, subtree: true });

    console.log('NavShield: Active with ' + blocklist.length + ' domains blocked.');
})();
true;
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn list(domains: &[&str]) -> Blocklist {
        Blocklist::from_domains(domains.iter().map(|d| d.to_string()))
    }

    #[test]
    fn test_script_embeds_config() {
        let script = build_injection(&InjectionConfig::new(true, list(&["ads.example.com", "t.net"])));

        assert!(script.contains("if (window.NavShield_AdBlock_Initialized) return;"));
        assert!(script.contains("const blockAds = true;"));
        assert!(script.contains(r#"const blocklist = ["ads.example.com","t.net"];"#));
        assert!(script.contains("Blocked by NavShield"));
        assert!(script.contains("NavShield blocked request to: "));
        assert!(script.trim_end().ends_with("true;"));
        assert!(!script.contains("__NS_"));
    }

    #[test]
    fn test_cosmetic_css_lists_every_selector() {
        let script = build_injection(&InjectionConfig::default());
        for selector in COSMETIC_SELECTORS {
            assert!(script.contains(selector), "missing selector {selector}");
        }
        assert!(script.contains(r#"const dynamicPattern = "[class*=\"ad-\"], [id*=\"ad-\"]";"#));
        assert_eq!(COSMETIC_SELECTORS.len(), 19);
    }

    #[test]
    fn test_disabled_flag() {
        let script = build_injection(&InjectionConfig::new(false, list(&["a.com"])));
        assert!(script.contains("const blockAds = false;"));
        assert!(script.contains("_self"));
    }

    #[test]
    fn test_empty_blocklist_uses_baseline() {
        let script = build_injection(&InjectionConfig::new(true, Blocklist::new()));
        assert!(script.contains(r#""doubleclick.net""#));
        assert!(script.contains(r#""facebook.net/en_US/fbevents.js""#));
    }

    #[test]
    fn test_hostile_entries_are_escaped() {
        let script = build_injection(&InjectionConfig::new(true, list(&["evil\"];alert(1);//"])));
        assert!(script.contains(r#"["evil\"];alert(1);//"]"#));
    }

    #[test]
    fn test_placeholder_text_in_entries_is_not_expanded() {
        let script = build_injection(&InjectionConfig::new(true, list(&["__NS_BLOCK_ADS__.com"])));
        assert!(script.contains(r#"["__NS_BLOCK_ADS__.com"]"#));
    }
}
