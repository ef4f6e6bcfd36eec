//! Runtime assembly: spawns the game worker and the ticker, and hands out
//! [`RuntimeHandle`]s wired to the command channel and the event bus.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use boss_core::{GameSession, PcgRng, PlayerStore};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::clock::{Clock, SystemClock};
use crate::config::RuntimeConfig;
use crate::events::EventBus;
use crate::repository::InMemoryPlayerStore;
use crate::workers::{Command, GameWorker, Ticker};

/// Running game: the worker task, the optional ticker task and a handle
/// template for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    worker_handle: JoinHandle<()>,
    ticker_handle: Option<JoinHandle<()>>,
}

impl Runtime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Start a runtime with an in-memory store and the system clock.
    pub async fn start(config: RuntimeConfig) -> Result<Runtime> {
        Self::builder().config(config).build().await
    }

    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Stop the ticker and wait for the worker to drain its queue.
    ///
    /// The worker only exits once every outstanding handle clone is dropped.
    pub async fn shutdown(self) -> Result<()> {
        if let Some(ticker) = self.ticker_handle {
            ticker.abort();
            // Cancellation is the expected outcome here.
            let _ = ticker.await;
        }
        drop(self.handle);

        self.worker_handle.await.map_err(RuntimeError::WorkerJoin)?;
        Ok(())
    }
}

/// Configures store, clock and seed before spawning the workers.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    store: Option<Arc<dyn PlayerStore + Send + Sync>>,
    clock: Option<Arc<dyn Clock>>,
    ticker: bool,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            store: None,
            clock: None,
            ticker: true,
        }
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Player store (default: in-memory)
    pub fn store(mut self, store: Arc<dyn PlayerStore + Send + Sync>) -> Self {
        self.store = Some(store);
        self
    }

    /// Time source (default: system clock)
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Fix the RNG seed, overriding the configuration
    pub fn rng_seed(mut self, seed: u64) -> Self {
        self.config.rng_seed = Some(seed);
        self
    }

    /// Enable or disable the periodic ticker task. Tests and simulations
    /// usually drive ticks by hand.
    pub fn ticker(mut self, enabled: bool) -> Self {
        self.ticker = enabled;
        self
    }

    /// Build the runtime and spawn its workers
    pub async fn build(self) -> Result<Runtime> {
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryPlayerStore::new()));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let seed = self.config.rng_seed.unwrap_or_else(rand::random);

        let session = GameSession::new(
            self.config.game.clone(),
            PcgRng::seeded(seed),
            clock.now_ms(),
        );
        info!(seed, "starting boss runtime");

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer.max(1));
        let event_bus = EventBus::with_capacity(self.config.event_buffer);
        let handle = RuntimeHandle::new(command_tx.clone(), event_bus.clone(), self.config.owner);

        let worker = GameWorker::new(session, store, clock, command_rx, event_bus);
        let worker_handle = tokio::task::spawn_blocking(move || worker.run());

        let ticker_handle = if self.ticker && self.config.tick_interval_ms > 0 {
            let ticker = Ticker::new(command_tx, self.config.tick_interval_ms);
            Some(tokio::spawn(async move {
                ticker.run().await;
            }))
        } else {
            None
        };

        Ok(Runtime {
            handle,
            worker_handle,
            ticker_handle,
        })
    }
}
