//! WebAssembly bindings for NavShield
//!
//! The host shell owns storage, prompts and the web surface. These bindings
//! expose the pure decision and list functions; every call takes the state
//! it needs as plain JS values.

use wasm_bindgen::prelude::*;

use ns_core::{Blocklist, DomainSet, FilterConfig, NavigationDecision, PolicyContext, Prompt, PromptChoice};
use ns_filters::{InjectionConfig, BUILTIN_BLOCKLIST, DEFAULT_SOURCE_URL};

#[wasm_bindgen]
pub fn decide_navigation(
    url: &str,
    current_url: &str,
    config: JsValue,
    allowed: JsValue,
    blocked: JsValue,
) -> JsValue {
    let allowed = DomainSet::from(string_list(&allowed));
    let blocked = DomainSet::from(string_list(&blocked));
    let ctx = PolicyContext {
        current_url,
        config: filter_config(&config),
        allowed: &allowed,
        blocked: &blocked,
    };

    let decision = ns_core::decide_navigation(url, ctx);
    if decision.prompt.is_some() {
        web_sys::console::debug_1(&format!("navshield: prompt for {url}").into());
    }
    decision_to_js(&decision)
}

#[wasm_bindgen]
pub fn resolve_prompt(
    host: &str,
    url: &str,
    choice: &str,
    allowed: JsValue,
    blocked: JsValue,
) -> Result<JsValue, JsValue> {
    let choice = PromptChoice::parse(choice)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown choice: {choice}")))?;
    let prompt = Prompt {
        host: host.to_string(),
        url: url.to_string(),
    };
    let mut allowed = DomainSet::from(string_list(&allowed));
    let mut blocked = DomainSet::from(string_list(&blocked));

    let outcome = ns_core::resolve_prompt(&prompt, choice, &mut allowed, &mut blocked);

    let result = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&result, &"changed".into(), &JsValue::from(outcome.changed));
    if let Some(navigate_to) = &outcome.navigate_to {
        let _ = js_sys::Reflect::set(&result, &"navigateTo".into(), &JsValue::from_str(navigate_to));
    }
    let _ = js_sys::Reflect::set(&result, &"allowed".into(), &to_js_array(allowed.iter()));
    let _ = js_sys::Reflect::set(&result, &"blocked".into(), &to_js_array(blocked.iter()));
    Ok(result.into())
}

#[wasm_bindgen]
pub fn build_injection(ad_block_enabled: bool, blocklist: JsValue) -> String {
    let config = InjectionConfig::new(ad_block_enabled, Blocklist::from(string_list(&blocklist)));
    ns_filters::build_injection(&config)
}

#[wasm_bindgen]
pub fn parse_hosts(text: &str) -> JsValue {
    let domains = ns_filters::parse_hosts_list(text);
    to_js_array(domains.iter().map(String::as_str)).into()
}

#[wasm_bindgen]
pub fn merge_with_baseline(domains: JsValue) -> JsValue {
    let (blocklist, stats) = ns_filters::merge_with_baseline(string_list(&domains));

    let result = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&result, &"blocklist".into(), &to_js_array(blocklist.iter()));
    let _ = js_sys::Reflect::set(&result, &"baseline".into(), &JsValue::from(stats.baseline as u32));
    let _ = js_sys::Reflect::set(&result, &"fetched".into(), &JsValue::from(stats.fetched as u32));
    let _ = js_sys::Reflect::set(&result, &"merged".into(), &JsValue::from(stats.merged as u32));
    let _ = js_sys::Reflect::set(&result, &"duplicates".into(), &JsValue::from(stats.duplicates as u32));
    result.into()
}

#[wasm_bindgen]
pub fn is_blocklisted(url: &str, blocklist: JsValue) -> bool {
    Blocklist::from(string_list(&blocklist)).matches_url(url)
}

#[wasm_bindgen]
pub fn normalize_domain(input: &str) -> Option<String> {
    ns_core::domain::normalize_domain(input)
}

#[wasm_bindgen]
pub fn builtin_blocklist() -> JsValue {
    to_js_array(BUILTIN_BLOCKLIST.iter().copied()).into()
}

#[wasm_bindgen]
pub fn default_source_url() -> String {
    DEFAULT_SOURCE_URL.to_string()
}

fn decision_to_js(decision: &NavigationDecision) -> JsValue {
    let result = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&result, &"allow".into(), &JsValue::from(decision.allow));
    let _ = js_sys::Reflect::set(&result, &"verdict".into(), &JsValue::from_str(decision.verdict.as_str()));

    if let Some(prompt) = &decision.prompt {
        let _ = js_sys::Reflect::set(&result, &"promptForHost".into(), &JsValue::from_str(&prompt.host));
        let js_prompt = js_sys::Object::new();
        let _ = js_sys::Reflect::set(&js_prompt, &"host".into(), &JsValue::from_str(&prompt.host));
        let _ = js_sys::Reflect::set(&js_prompt, &"url".into(), &JsValue::from_str(&prompt.url));
        let _ = js_sys::Reflect::set(&js_prompt, &"message".into(), &JsValue::from_str(&prompt.message()));
        let labels = to_js_array(prompt.choices().iter().map(|c| c.label()));
        let _ = js_sys::Reflect::set(&js_prompt, &"choices".into(), &labels);
        let _ = js_sys::Reflect::set(&result, &"prompt".into(), &js_prompt);
    }
    if let Some(navigate_to) = &decision.navigate_to {
        let _ = js_sys::Reflect::set(&result, &"navigateTo".into(), &JsValue::from_str(navigate_to));
    }

    result.into()
}

/// Read `{ adBlockEnabled, externalBlockEnabled }`. Missing or non-boolean
/// fields keep their defaults.
fn filter_config(value: &JsValue) -> FilterConfig {
    let defaults = FilterConfig::default();
    if !value.is_object() {
        return defaults;
    }
    let flag = |key: &str, default: bool| {
        js_sys::Reflect::get(value, &key.into())
            .ok()
            .and_then(|v| v.as_bool())
            .unwrap_or(default)
    };
    FilterConfig {
        ad_block_enabled: flag("adBlockEnabled", defaults.ad_block_enabled),
        external_block_enabled: flag("externalBlockEnabled", defaults.external_block_enabled),
    }
}

/// Strings of a JS array. `null`, `undefined` and non-arrays read as empty.
fn string_list(value: &JsValue) -> Vec<String> {
    if !js_sys::Array::is_array(value) {
        return Vec::new();
    }
    js_sys::Array::from(value)
        .iter()
        .filter_map(|v| v.as_string())
        .collect()
}

fn to_js_array<'a>(items: impl Iterator<Item = &'a str>) -> js_sys::Array {
    let array = js_sys::Array::new();
    for item in items {
        array.push(&JsValue::from_str(item));
    }
    array
}
