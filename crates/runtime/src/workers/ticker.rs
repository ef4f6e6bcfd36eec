//! Periodic driver for the event scheduler.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

use super::game::{Command, LOG_TARGET};

/// Sends `Command::Tick` to the game worker at a fixed cadence.
///
/// Missed ticks are skipped rather than bursted; the scheduler compares
/// against the clock, so a late tick loses nothing.
pub struct Ticker {
    command_tx: mpsc::Sender<Command>,
    interval: Duration,
}

impl Ticker {
    pub fn new(command_tx: mpsc::Sender<Command>, interval_ms: u64) -> Self {
        Self {
            command_tx,
            interval: Duration::from_millis(interval_ms.max(1)),
        }
    }

    pub async fn run(self) {
        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if self
                .command_tx
                .send(Command::Tick { reply: None })
                .await
                .is_err()
            {
                debug!(target: LOG_TARGET, "game worker gone, ticker stopping");
                break;
            }
        }
    }
}
