//! NavShield CLI
//!
//! Drives the navigation policy, the user's domain lists and the filter list
//! cache against a file-backed store.

use std::fs;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand, ValueEnum};

use ns_core::{BrowserState, FileStore, KeyValueStore, ListKind, PromptChoice};
use ns_filters::provider::{last_update, read_cache};
use ns_filters::{
    baseline, build_injection, FilterListProvider, InjectionConfig, ListSource, ProviderConfig, DEFAULT_SOURCE_URL,
};

#[derive(Parser)]
#[command(name = "navshield")]
#[command(about = "NavShield navigation policy and content filter tools")]
struct Cli {
    /// Settings store file
    #[arg(long, global = true, default_value = "navshield.json")]
    store: String,

    /// Log progress output (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decide what happens when the page navigates to URL
    Decide {
        url: String,

        /// Record the URL as current when the navigation goes through
        #[arg(long)]
        commit: bool,

        /// Print the decision as JSON
        #[arg(long)]
        json: bool,
    },

    /// Answer the prompt raised for URL
    Choose {
        url: String,

        /// always-block, cancel or always-allow
        choice: String,
    },

    /// Always allow a domain
    Allow { domain: String },

    /// Always block a domain
    Block { domain: String },

    /// Remove a domain from a list
    Remove {
        #[arg(value_enum)]
        list: ListArg,
        domain: String,
    },

    /// Show the allowed and blocked domains
    Lists,

    /// Change a setting
    Set {
        #[arg(value_enum)]
        setting: Setting,
        value: String,
    },

    /// Refresh the cached filter list
    Refresh {
        /// Hosts-format list URL
        #[arg(long, default_value = DEFAULT_SOURCE_URL)]
        source: String,

        #[arg(long, default_value_t = 15)]
        timeout_secs: u64,

        /// Ignore the cache age
        #[arg(long)]
        force: bool,
    },

    /// Print the content filter script
    Inject {
        /// Write the script to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Show current settings and cache state
    Status,

    /// Clear both domain lists and restore the default filter settings
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ListArg {
    Allowed,
    Blocked,
}

impl From<ListArg> for ListKind {
    fn from(list: ListArg) -> Self {
        match list {
            ListArg::Allowed => ListKind::Allowed,
            ListArg::Blocked => ListKind::Blocked,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Setting {
    AdBlock,
    ExternalBlock,
    CurrentUrl,
}

fn main() {
    let cli = Cli::parse();

    let env = env_logger::Env::default().filter_or("RUST_LOG", if cli.verbose { "info" } else { "warn" });
    env_logger::init_from_env(env);
    log::debug!("Using store '{}'", cli.store);

    let result = FileStore::open(&cli.store)
        .map_err(|e| format!("Failed to open store '{}': {}", cli.store, e))
        .and_then(|mut store| run(cli.command, &mut store));

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run<S: KeyValueStore>(command: Commands, store: &mut S) -> Result<(), String> {
    match command {
        Commands::Decide { url, commit, json } => cmd_decide(store, &url, commit, json),
        Commands::Choose { url, choice } => cmd_choose(store, &url, &choice),
        Commands::Allow { domain } => cmd_add(store, ListKind::Allowed, &domain),
        Commands::Block { domain } => cmd_add(store, ListKind::Blocked, &domain),
        Commands::Remove { list, domain } => cmd_remove(store, list.into(), &domain),
        Commands::Lists => cmd_lists(store),
        Commands::Set { setting, value } => cmd_set(store, setting, &value),
        Commands::Refresh {
            source,
            timeout_secs,
            force,
        } => cmd_refresh(store, source, timeout_secs, force),
        Commands::Inject { output } => cmd_inject(store, output.as_deref()),
        Commands::Status => cmd_status(store),
        Commands::Reset { yes } => cmd_reset(store, yes),
    }
}

fn cmd_decide<S: KeyValueStore>(store: &mut S, url: &str, commit: bool, json: bool) -> Result<(), String> {
    let mut state = BrowserState::load(&*store);
    let decision = state.decide(url);

    if json {
        let out = serde_json::to_string_pretty(&decision).map_err(|e| format!("Failed to encode decision: {}", e))?;
        println!("{out}");
    } else {
        println!("{} ({})", if decision.allow { "ALLOW" } else { "DENY" }, decision.verdict);
        if let Some(prompt) = &decision.prompt {
            println!();
            println!("{}", prompt.message());
            let labels: Vec<_> = prompt.choices().iter().map(|c| c.label()).collect();
            println!("  [{}]", labels.join("] ["));
        }
        if let Some(target) = &decision.navigate_to {
            println!("  -> {}", target);
        }
    }

    if commit {
        let next = if decision.allow {
            Some(url)
        } else {
            decision.navigate_to.as_deref()
        };
        if let Some(next) = next {
            state.set_current_url(store, next);
        }
    }

    Ok(())
}

fn cmd_choose<S: KeyValueStore>(store: &mut S, url: &str, choice: &str) -> Result<(), String> {
    let choice = PromptChoice::parse(choice).ok_or_else(|| format!("Unknown choice '{}'", choice))?;
    let mut state = BrowserState::load(&*store);

    let prompt = state
        .decide(url)
        .prompt
        .ok_or_else(|| format!("No prompt pending for '{}'", url))?;
    let outcome = state.apply_choice(store, &prompt, choice);

    match choice {
        PromptChoice::AlwaysBlock => println!("Blocked {}", prompt.host),
        PromptChoice::Cancel => println!("Cancelled"),
        PromptChoice::AlwaysAllow => println!("Allowed {}", prompt.host),
    }
    if let Some(target) = outcome.navigate_to {
        println!("  -> {}", target);
    }
    Ok(())
}

fn cmd_add<S: KeyValueStore>(store: &mut S, kind: ListKind, input: &str) -> Result<(), String> {
    let mut state = BrowserState::load(&*store);
    let added = state
        .add_domain(store, kind, input)
        .ok_or_else(|| format!("'{}' is empty or already listed", input.trim()))?;
    println!("Added {} to {} domains", added, list_name(kind));
    Ok(())
}

fn cmd_remove<S: KeyValueStore>(store: &mut S, kind: ListKind, host: &str) -> Result<(), String> {
    let mut state = BrowserState::load(&*store);
    if !state.remove_domain(store, kind, host) {
        return Err(format!("'{}' is not in {} domains", host, list_name(kind)));
    }
    println!("Removed {} from {} domains", host, list_name(kind));
    Ok(())
}

fn cmd_lists<S: KeyValueStore>(store: &mut S) -> Result<(), String> {
    let state = BrowserState::load(&*store);
    for kind in [ListKind::Allowed, ListKind::Blocked] {
        let list = state.list(kind);
        println!("{} ({}):", list_name(kind), list.len());
        for host in list.iter() {
            println!("  {}", host);
        }
    }
    Ok(())
}

fn cmd_set<S: KeyValueStore>(store: &mut S, setting: Setting, value: &str) -> Result<(), String> {
    let mut state = BrowserState::load(&*store);
    match setting {
        Setting::AdBlock => state.set_ad_block_enabled(store, parse_toggle(value)?),
        Setting::ExternalBlock => state.set_external_block_enabled(store, parse_toggle(value)?),
        Setting::CurrentUrl => {
            if value.trim().is_empty() {
                return Err("URL must not be empty".to_string());
            }
            state.set_current_url(store, value.trim());
        }
    }
    println!("Updated");
    Ok(())
}

fn cmd_refresh<S: KeyValueStore>(store: &mut S, source: String, timeout_secs: u64, force: bool) -> Result<(), String> {
    let config = ProviderConfig {
        source_url: source,
        timeout: Duration::from_secs(timeout_secs),
        ..ProviderConfig::default()
    };
    let provider = FilterListProvider::http(config).map_err(|e| format!("Failed to create HTTP client: {}", e))?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start runtime: {}", e))?;
    let lists = runtime.block_on(provider.fetch_filter_lists(store, force));

    match lists.source {
        ListSource::Cache => println!("Cache is fresh ({} domains)", lists.blocklist.len()),
        ListSource::Remote(stats) => {
            println!("Refreshed filter list from '{}'", provider.config().source_url);
            println!("  Fetched:    {}", stats.fetched);
            println!("  Built-in:   {}", stats.baseline);
            println!("  Duplicates: {}", stats.duplicates);
            println!("  Total:      {}", stats.merged);
        }
        ListSource::Builtin => println!("Refresh failed, using built-in list ({} domains)", lists.blocklist.len()),
    }
    Ok(())
}

fn cmd_inject<S: KeyValueStore>(store: &mut S, output: Option<&str>) -> Result<(), String> {
    let state = BrowserState::load(&*store);
    let blocklist = read_cache(&*store).unwrap_or_else(baseline);
    let script = build_injection(&InjectionConfig::new(state.config.ad_block_enabled, blocklist));

    match output {
        Some(path) => {
            fs::write(path, &script).map_err(|e| format!("Failed to write '{}': {}", path, e))?;
            println!("Wrote {} bytes to '{}'", script.len(), path);
        }
        None => print!("{}", script),
    }
    Ok(())
}

fn cmd_status<S: KeyValueStore>(store: &mut S) -> Result<(), String> {
    let state = BrowserState::load(&*store);
    let cache = read_cache(&*store);

    println!("Current URL:     {}", state.current_url);
    println!("Ad block:        {}", on_off(state.config.ad_block_enabled));
    println!("External block:  {}", on_off(state.config.external_block_enabled));
    println!("Allowed domains: {}", state.allowed.len());
    println!("Blocked domains: {}", state.blocked.len());
    match (cache, last_update(&*store)) {
        (Some(list), Some(updated)) => {
            let age = now_millis().saturating_sub(updated) / 1000;
            println!("Filter list:     {} domains, updated {}s ago", list.len(), age);
        }
        (Some(list), None) => println!("Filter list:     {} domains, never refreshed", list.len()),
        (None, _) => println!("Filter list:     built-in ({} domains)", baseline().len()),
    }
    Ok(())
}

fn cmd_reset<S: KeyValueStore>(store: &mut S, confirmed: bool) -> Result<(), String> {
    if !confirmed {
        return Err("Refusing to reset without --yes".to_string());
    }
    let mut state = BrowserState::load(&*store);
    state.reset(store);
    println!("Cleared allowed and blocked domains; filters restored to defaults");
    Ok(())
}

fn parse_toggle(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Ok(true),
        "off" | "false" | "0" | "no" => Ok(false),
        other => Err(format!("Expected on/off, got '{}'", other)),
    }
}

fn list_name(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Allowed => "allowed",
        ListKind::Blocked => "blocked",
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
