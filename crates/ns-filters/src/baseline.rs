//! Built-in blocklist compiled into the binary

use ns_core::Blocklist;

/// Peter Lowe's ad and tracking server list in hosts format.
pub const DEFAULT_SOURCE_URL: &str =
    "https://pgl.yoyo.org/adservers/serverlist.php?hostformat=hosts&showintro=0&mimetype=plaintext";

/// Always blocked, whatever the remote list says.
pub const BUILTIN_BLOCKLIST: &[&str] = &[
    "doubleclick.net",
    "googlesyndication.com",
    "google-analytics.com",
    "adnxs.com",
    "adservice.google",
    "taboola.com",
    "outbrain.com",
    "facebook.net/en_US/fbevents.js",
    "amazon-adsystem.com",
    "advertising.com",
    "scorecardresearch.com",
    "quantserve.com",
];

/// The built-in list as a [`Blocklist`].
pub fn baseline() -> Blocklist {
    Blocklist::from_domains(BUILTIN_BLOCKLIST.iter().map(|d| d.to_string()))
}
