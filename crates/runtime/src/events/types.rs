//! Payloads carried by the event bus.

use serde::{Deserialize, Serialize};

use boss_core::{ChaosEffect, GameSnapshot};

/// Full state pushed to viewers, with the line that explains why.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateBroadcast {
    pub snapshot: GameSnapshot,
    pub toast: Option<String>,
    pub chaos: Option<ChaosEffect>,
}

impl StateBroadcast {
    pub fn new(snapshot: GameSnapshot) -> Self {
        Self {
            snapshot,
            toast: None,
            chaos: None,
        }
    }

    #[must_use]
    pub fn with_toast(mut self, toast: Option<String>) -> Self {
        self.toast = toast;
        self
    }

    #[must_use]
    pub fn with_chaos(mut self, chaos: Option<ChaosEffect>) -> Self {
        self.chaos = chaos;
        self
    }

    /// JSON text for socket transports.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
