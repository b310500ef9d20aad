//! Request classification
//!
//! Matching is substring containment on the lowercased URL, so a listed token
//! covers subdomains and path-embedded beacons such as `facebook.com/tr`.

use serde::{Deserialize, Serialize};
use url::Url;

/// Ad-serving domain tokens
pub const AD_DOMAINS: &[&str] = &[
    "doubleclick.net",
    "googleadservices.com",
    "googlesyndication.com",
    "google-analytics.com",
    "facebook.com/tr",
    "amazon-adsystem.com",
];

/// Tracker domain tokens
///
/// `adservice.google.com` also covers every country-code variant
/// (`adservice.google.com.eg`, `adservice.google.com.pk`, ...).
pub const TRACKER_DOMAINS: &[&str] = &[
    "google-analytics.com",
    "facebook.com/tr",
    "doubleclick.net",
    "googletagmanager.com",
    "scorecardresearch.com",
    "adservice.google.com",
    "googletagservices.com",
    "quantserve.com",
    "adnxs.com",
    "criteo.com",
    "rubiconproject.com",
    "openx.net",
    "pubmatic.com",
    "adsafeprotected.com",
    "moatads.com",
    "adform.net",
    "advertising.com",
    "outbrain.com",
    "taboola.com",
    "zedo.com",
    "exelator.com",
    "bluekai.com",
    "mathtag.com",
    "bidswitch.net",
    "casalemedia.com",
    "contextweb.com",
    "lijit.com",
    "media.net",
    "serving-sys.com",
    "simpli.fi",
    "spotxchange.com",
    "teads.tv",
    "tradedoubler.com",
    "turn.com",
    "yahoo.com",
    "yieldmo.com",
    "yieldoptimizer.com",
    "yldbt.com",
    "yldmgrimg.net",
    "yoc.com",
    "zeotap.com",
];

/// Result of evaluating one request. Never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDecision {
    pub is_ad: bool,
    pub is_tracker: bool,
    pub blocked: bool,
}

impl BlockDecision {
    pub const ALLOWED: BlockDecision = BlockDecision {
        is_ad: false,
        is_tracker: false,
        blocked: false,
    };
}

pub struct BlockListEngine {
    /// Ad tokens, lowercased
    ad_domains: Vec<String>,
    /// Tracker tokens, lowercased
    tracker_domains: Vec<String>,
    /// Host that is never upgraded to https
    dev_host: String,
    /// Whether classification is enabled
    blocking_enabled: bool,
    /// Whether the protocol-upgrade rule is enabled
    upgrade_enabled: bool,
}

impl BlockListEngine {
    pub fn new() -> Self {
        Self::with_domains(
            AD_DOMAINS.iter().map(|s| s.to_string()),
            TRACKER_DOMAINS.iter().map(|s| s.to_string()),
        )
    }

    pub fn with_domains<A, T>(ads: A, trackers: T) -> Self
    where
        A: IntoIterator<Item = String>,
        T: IntoIterator<Item = String>,
    {
        Self {
            ad_domains: normalize_tokens(ads),
            tracker_domains: normalize_tokens(trackers),
            dev_host: "localhost".to_string(),
            blocking_enabled: true,
            upgrade_enabled: true,
        }
    }

    pub fn set_dev_host(&mut self, host: &str) {
        self.dev_host = host.trim().to_lowercase();
    }

    pub fn dev_host(&self) -> &str {
        &self.dev_host
    }

    pub fn set_blocking_enabled(&mut self, enabled: bool) {
        if self.blocking_enabled != enabled {
            tracing::info!(enabled, "Request blocking toggled");
        }
        self.blocking_enabled = enabled;
    }

    pub fn is_blocking_enabled(&self) -> bool {
        self.blocking_enabled
    }

    pub fn set_upgrade_enabled(&mut self, enabled: bool) {
        if self.upgrade_enabled != enabled {
            tracing::info!(enabled, "HTTPS upgrade toggled");
        }
        self.upgrade_enabled = enabled;
    }

    pub fn is_upgrade_enabled(&self) -> bool {
        self.upgrade_enabled
    }

    pub fn ad_domain_count(&self) -> usize {
        self.ad_domains.len()
    }

    pub fn tracker_domain_count(&self) -> usize {
        self.tracker_domains.len()
    }

    /// Classify a request URL. Both lists are evaluated independently.
    pub fn classify(&self, url: &str) -> BlockDecision {
        if !self.blocking_enabled {
            return BlockDecision::ALLOWED;
        }

        let url = url.to_lowercase();
        let is_ad = self.ad_domains.iter().any(|d| url.contains(d.as_str()));
        let is_tracker = self
            .tracker_domains
            .iter()
            .any(|d| url.contains(d.as_str()));

        if is_ad || is_tracker {
            tracing::debug!(url = %url, is_ad, is_tracker, "Request matched block list");
        }

        BlockDecision {
            is_ad,
            is_tracker,
            blocked: is_ad || is_tracker,
        }
    }

    /// Rewrite a plain-text request to its encrypted equivalent.
    ///
    /// Returns `None` when the request should proceed untouched: already
    /// encrypted, not http, unparseable, or addressed to the dev host.
    pub fn upgrade(&self, url: &str) -> Option<String> {
        if !self.upgrade_enabled {
            return None;
        }

        let mut parsed = Url::parse(url).ok()?;
        if parsed.scheme() != "http" {
            return None;
        }

        let host = parsed.host_str()?.to_lowercase();
        if host == self.dev_host {
            return None;
        }

        parsed.set_scheme("https").ok()?;

        // The explicit port belonged to the plain-text service
        if parsed.port() == Some(80) {
            parsed.set_port(None).ok()?;
        }

        Some(parsed.to_string())
    }
}

impl Default for BlockListEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_tokens<I>(tokens: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut out: Vec<String> = Vec::new();
    for token in tokens {
        let token = token.trim().to_lowercase();
        if !token.is_empty() && !out.contains(&token) {
            out.push(token);
        }
    }
    out
}
