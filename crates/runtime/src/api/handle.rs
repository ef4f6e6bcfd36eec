//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for every
//! session operation plus topic subscriptions on the event bus.
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};

use boss_core::state::DamageReport;
use boss_core::{
    ActionKind, ActionOutcome, Actor, EventKind, GameSnapshot, PlayerRecord, Role,
    SkillAdjustment, Tribute, TributeReport,
};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
    owner: Option<Arc<str>>,
}

impl RuntimeHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<Command>,
        event_bus: EventBus,
        owner: Option<String>,
    ) -> Self {
        Self {
            command_tx,
            event_bus,
            owner: owner.map(Arc::from),
        }
    }

    /// Builds an actor from a transport-level permission string. The
    /// configured owner is always admin.
    pub fn actor(&self, username: &str, level: &str, subscriber: bool) -> Actor {
        let role = Role::resolve(level, username, self.owner.as_deref());
        Actor::new(username, role).with_subscriber(subscriber)
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Resolve a chat action. A cooldown block is `Ok`, not an error.
    pub async fn resolve_action(&self, actor: Actor, action: ActionKind) -> Result<ActionOutcome> {
        Ok(self
            .request(|reply| Command::Action {
                actor,
                action,
                reply,
            })
            .await??)
    }

    /// Parse and resolve raw chat text such as `"!ue"`.
    pub async fn resolve_command(&self, actor: Actor, text: &str) -> Result<ActionOutcome> {
        let text = text.to_owned();
        Ok(self
            .request(|reply| Command::ChatCommand { actor, text, reply })
            .await??)
    }

    pub async fn tribute(&self, tribute: Tribute) -> Result<TributeReport> {
        Ok(self
            .request(|reply| Command::Tribute { tribute, reply })
            .await??)
    }

    /// Run one scheduler tick now and wait for it to finish.
    pub async fn tick(&self) -> Result<()> {
        self.request(|reply| Command::Tick { reply: Some(reply) })
            .await
    }

    /// Returns false if the stream was already in that state.
    pub async fn set_stream_live(&self, live: bool) -> Result<bool> {
        self.request(|reply| Command::SetStreamLive { live, reply })
            .await
    }

    /// Start `kind` immediately. Returns false if it could not start.
    pub async fn start_event(&self, kind: EventKind) -> Result<bool> {
        self.request(|reply| Command::StartEvent { kind, reply })
            .await
    }

    pub async fn set_phase(&self, actor: Actor, phase: u32) -> Result<()> {
        Ok(self
            .request(|reply| Command::SetPhase {
                actor,
                phase,
                reply,
            })
            .await??)
    }

    pub async fn apply_damage(
        &self,
        actor: Actor,
        target: &str,
        amount: i64,
        source: &str,
    ) -> Result<DamageReport> {
        let target = target.to_owned();
        let source = source.to_owned();
        Ok(self
            .request(|reply| Command::ApplyDamage {
                actor,
                target,
                amount,
                source,
                reply,
            })
            .await??)
    }

    pub async fn reset_boss(&self, actor: Actor) -> Result<()> {
        Ok(self
            .request(|reply| Command::ResetBoss { actor, reply })
            .await??)
    }

    /// Returns the HP actually set after clamping.
    pub async fn set_hp(&self, actor: Actor, hp: i64) -> Result<u32> {
        Ok(self
            .request(|reply| Command::SetHp { actor, hp, reply })
            .await??)
    }

    pub async fn set_paused(&self, actor: Actor, paused: bool) -> Result<()> {
        Ok(self
            .request(|reply| Command::SetPaused {
                actor,
                paused,
                reply,
            })
            .await??)
    }

    pub async fn clear_hits(&self, actor: Actor) -> Result<()> {
        Ok(self
            .request(|reply| Command::ClearHits { actor, reply })
            .await??)
    }

    pub async fn adjust_skill(
        &self,
        actor: Actor,
        username: &str,
        adjustment: SkillAdjustment,
    ) -> Result<PlayerRecord> {
        let username = username.to_owned();
        Ok(self
            .request(|reply| Command::AdjustSkill {
                actor,
                username,
                adjustment,
                reply,
            })
            .await??)
    }

    /// Grant XP to one player, creating them if needed.
    pub async fn add_xp(&self, actor: Actor, username: &str, amount: i64) -> Result<PlayerRecord> {
        let username = username.to_owned();
        Ok(self
            .request(|reply| Command::AddXp {
                actor,
                username,
                amount,
                reply,
            })
            .await??)
    }

    /// Reset every player's XP, level and cooldowns. Returns the player count.
    pub async fn reset_xp(&self, actor: Actor) -> Result<usize> {
        Ok(self
            .request(|reply| Command::ResetXp { actor, reply })
            .await??)
    }

    /// Put every player back on the skill floor. Returns the player count.
    pub async fn reset_all_skills(&self, actor: Actor) -> Result<usize> {
        Ok(self
            .request(|reply| Command::ResetSkills { actor, reply })
            .await??)
    }

    /// Record chat presence for mark selection. Does not wait for the worker.
    pub async fn touch_activity(&self, user: &str) -> Result<()> {
        self.command_tx
            .send(Command::TouchActivity {
                user: user.to_owned(),
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }

    /// Query the current game state (read-only snapshot)
    /// Current state with both leaderboards filled in.
    pub async fn snapshot(&self) -> Result<GameSnapshot> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::State` - Snapshots with toast text, for viewers
    /// - `Topic::Session` - Every session notice, including silent ones
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
