//! Runs the generated content filter inside a JS engine against a stubbed
//! page (window, document, MutationObserver, fetch, XMLHttpRequest).

use boa_engine::{Context, Source};
use ns_core::Blocklist;
use ns_filters::{build_injection, InjectionConfig};

const PAGE: &str = r#"
var __fetched = [];
var __opened = [];
var __appended = [];
var __observers = [];
var __links = [
    { tagName: 'A', target: '_blank' },
    { tagName: 'A', target: '_top' },
];

globalThis.window = globalThis;
globalThis.console = { log: function() {} };

globalThis.URL = class URL {
    constructor(href) {
        const m = /^[a-z][a-z0-9+.-]*:\/\/([^\/?#:]*)/i.exec(href);
        if (!m || m[1] === '') throw new TypeError('Invalid URL: ' + href);
        this.href = href;
        this.hostname = m[1].toLowerCase();
    }
};

globalThis.Request = class Request {
    constructor(url) { this.url = url; }
};

globalThis.fetch = function(input) {
    __fetched.push(input);
    return 'sent';
};

globalThis.XMLHttpRequest = class XMLHttpRequest {
    constructor() { this.aborted = false; this.opened = null; }
    abort() { this.aborted = true; }
    open(method, url) { this.opened = url; __opened.push(url); }
};

globalThis.MutationObserver = class MutationObserver {
    constructor(callback) { this.callback = callback; __observers.push(this); }
    observe() {}
};

globalThis.document = {
    head: { appendChild(node) { __appended.push(node); } },
    documentElement: { appendChild(node) { __appended.push(node); } },
    createElement(tag) { return { tagName: tag.toUpperCase(), textContent: '' }; },
    querySelectorAll(selector) {
        return selector === 'a[target="_blank"]' ? __links.filter((l) => l.target === '_blank') : [];
    },
};

function __insert(node) {
    __observers.forEach((o) => o.callback([{ addedNodes: [node] }]));
}
"#;

struct Page {
    ctx: Context,
}

impl Page {
    fn new() -> Self {
        let mut ctx = Context::default();
        if let Err(e) = ctx.eval(Source::from_bytes(PAGE)) {
            panic!("page stubs failed: {e:?}");
        }
        Self { ctx }
    }

    fn inject(&mut self, ad_block_enabled: bool, domains: &[&str]) -> bool {
        let blocklist = Blocklist::from_domains(domains.iter().map(|d| d.to_string()));
        let script = build_injection(&InjectionConfig::new(ad_block_enabled, blocklist));
        self.eval_bool(&script)
    }

    fn eval_bool(&mut self, code: &str) -> bool {
        let value = match self.ctx.eval(Source::from_bytes(code)) {
            Ok(value) => value,
            Err(e) => panic!("evaluation failed: {e:?}\n{code}"),
        };
        match value.as_boolean() {
            Some(b) => b,
            None => panic!("expected a boolean from:\n{code}"),
        }
    }

    fn run_jobs(&mut self) {
        self.ctx.run_jobs();
    }
}

const ADS: &[&str] = &["ads.example.com"];

#[test]
fn test_script_evaluates_to_true() {
    let mut page = Page::new();
    assert!(page.inject(true, ADS));
}

#[test]
fn test_fetch_to_blocklisted_host_is_rejected() {
    let mut page = Page::new();
    page.inject(true, ADS);

    assert!(page.eval_bool(
        r#"
        var __rejected = null;
        var p = fetch('https://cdn.ads.example.com/pixel.js');
        p.catch((e) => { __rejected = e.message; });
        p instanceof Promise && __fetched.length === 0
        "#
    ));
    page.run_jobs();
    assert!(page.eval_bool("__rejected === 'Blocked by NavShield'"));

    assert!(page.eval_bool(
        r#"
        fetch(new Request('https://ads.example.com/x')).catch(() => {});
        fetch('//ads.example.com/protocol-relative').catch(() => {});
        __fetched.length === 0
        "#
    ));
    assert!(page.eval_bool("fetch('https://example.com/app.js') === 'sent' && __fetched.length === 1"));
}

#[test]
fn test_fetch_passes_through_when_ad_block_disabled() {
    let mut page = Page::new();
    page.inject(false, ADS);

    assert!(page.eval_bool(
        "fetch('https://cdn.ads.example.com/pixel.js') === 'sent' && __fetched.length === 1"
    ));
    assert!(page.eval_bool("__appended.length === 0"));
}

#[test]
fn test_xhr_open_aborts_blocklisted_request() {
    let mut page = Page::new();
    page.inject(true, ADS);

    assert!(page.eval_bool(
        r#"
        var blocked = new XMLHttpRequest();
        blocked.open('GET', 'https://ads.example.com/track');
        var normal = new XMLHttpRequest();
        normal.open('GET', 'https://example.com/api');
        blocked.aborted && blocked.opened === null
            && !normal.aborted && normal.opened === 'https://example.com/api'
        "#
    ));
}

#[test]
fn test_blank_links_rewritten_even_when_disabled() {
    let mut page = Page::new();
    page.inject(false, ADS);

    assert!(page.eval_bool("__links[0].target === '_self' && __links[1].target === '_top'"));
    assert!(page.eval_bool(
        r#"
        var link = { nodeType: 1, tagName: 'A', target: '_blank' };
        __insert(link);
        link.target === '_self'
        "#
    ));
}

#[test]
fn test_cosmetic_stylesheet_and_dynamic_cleanup() {
    let mut page = Page::new();
    page.inject(true, ADS);

    assert!(page.eval_bool(
        "__appended.length === 1 && __appended[0].textContent.indexOf('.adsbygoogle') >= 0"
    ));
    assert!(page.eval_bool(
        r#"
        var script = {
            nodeType: 1, tagName: 'SCRIPT', src: 'https://ads.example.com/a.js',
            removed: false, remove() { this.removed = true; },
        };
        var banner = {
            nodeType: 1, tagName: 'DIV', hidden: null,
            matches(pattern) { return pattern.indexOf('ad-') >= 0; },
            style: { setProperty(k, v, p) { banner.hidden = k + ':' + v + ':' + p; } },
        };
        var ok = { nodeType: 1, tagName: 'SCRIPT', src: 'https://example.com/app.js', removed: false, remove() { this.removed = true; } };
        __insert(script);
        __insert(banner);
        __insert(ok);
        script.removed && banner.hidden === 'display:none:important' && !ok.removed
        "#
    ));
}

#[test]
fn test_second_injection_is_a_no_op() {
    let mut page = Page::new();
    page.inject(true, ADS);
    page.eval_bool("var __wrapped = fetch; var __observerCount = __observers.length; true");

    assert!(page.inject(true, &["other.example.org"]));

    assert!(page.eval_bool(
        "fetch === __wrapped && __observers.length === __observerCount && __appended.length === 1"
    ));
    assert!(page.eval_bool("fetch('https://other.example.org/x') === 'sent'"));
}
