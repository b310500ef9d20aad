//! Process-lifetime block counters

use serde::{Deserialize, Serialize};

use crate::blocklist::BlockDecision;

/// Monotonic counts of blocked requests. Reset only by process restart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStats {
    pub ads_blocked: u64,
    pub trackers_blocked: u64,
}

impl BlockStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a decision. Returns true if either counter moved.
    pub fn record(&mut self, decision: &BlockDecision) -> bool {
        if decision.is_ad {
            self.ads_blocked = self.ads_blocked.saturating_add(1);
        }
        if decision.is_tracker {
            self.trackers_blocked = self.trackers_blocked.saturating_add(1);
        }
        decision.blocked
    }

    pub fn total(&self) -> u64 {
        self.ads_blocked.saturating_add(self.trackers_blocked)
    }
}
