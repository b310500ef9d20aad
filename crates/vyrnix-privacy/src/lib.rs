//! Vyrnix Privacy Protection
//!
//! Every request a content view makes passes through the same interception
//! hook, top-level navigations included:
//! - Ad and tracker classification by substring match against curated lists
//! - Plain-text to encrypted protocol upgrade, except for the dev host
//! - Process-lifetime block counters

mod blocklist;
mod stats;

pub use blocklist::{BlockDecision, BlockListEngine, AD_DOMAINS, TRACKER_DOMAINS};
pub use stats::BlockStats;
