use std::collections::BTreeMap;

use crate::state::{UNKNOWN_USER, normalize_username};

/// Last-seen timestamps of recently active users, used to pick mark targets.
///
/// Ordered by username so the candidate list handed to the RNG is stable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActivityTracker {
    seen: BTreeMap<String, u64>,
}

impl ActivityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `user` as active at `now_ms` and drops entries older than `window_ms`.
    pub fn touch(&mut self, user: &str, now_ms: u64, window_ms: u64) {
        let user = normalize_username(user);
        if user == UNKNOWN_USER {
            return;
        }
        self.seen.insert(user, now_ms);
        self.prune(now_ms, window_ms);
    }

    pub fn prune(&mut self, now_ms: u64, window_ms: u64) {
        self.seen
            .retain(|_, seen_at| now_ms.saturating_sub(*seen_at) <= window_ms);
    }

    pub fn candidates(&self) -> Vec<&str> {
        self.seen.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
