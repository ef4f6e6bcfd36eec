//! Game worker that owns the authoritative [`GameSession`].
//!
//! Receives commands from [`crate::RuntimeHandle`] and the ticker, runs each
//! one to completion against the session, then logs and publishes whatever the
//! session reported.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use boss_core::state::DamageReport;
use boss_core::{
    ActionError, ActionKind, ActionOutcome, Actor, ErrorKind, EventKind, GameSession,
    GameSnapshot, Leaderboards, PcgRng, PlayerRecord, PlayerStore, SessionEvent, SkillAdjustment, Tribute,
    TributeReport,
};

use crate::clock::Clock;
use crate::events::{Event, EventBus, StateBroadcast};

pub(crate) const LOG_TARGET: &str = "boss_runtime::worker";

type Reply<T> = oneshot::Sender<Result<T, ActionError>>;

/// Commands that can be sent to the game worker
pub enum Command {
    Action {
        actor: Actor,
        action: ActionKind,
        reply: Reply<ActionOutcome>,
    },
    /// Raw chat text such as `"!attack"`.
    ChatCommand {
        actor: Actor,
        text: String,
        reply: Reply<ActionOutcome>,
    },
    Tribute {
        tribute: Tribute,
        reply: Reply<TributeReport>,
    },
    /// Advance the event scheduler. The ticker sends these without a reply.
    Tick { reply: Option<oneshot::Sender<()>> },
    SetStreamLive {
        live: bool,
        reply: oneshot::Sender<bool>,
    },
    StartEvent {
        kind: EventKind,
        reply: oneshot::Sender<bool>,
    },
    SetPhase {
        actor: Actor,
        phase: u32,
        reply: Reply<()>,
    },
    ApplyDamage {
        actor: Actor,
        target: String,
        amount: i64,
        source: String,
        reply: Reply<DamageReport>,
    },
    ResetBoss {
        actor: Actor,
        reply: Reply<()>,
    },
    SetHp {
        actor: Actor,
        hp: i64,
        reply: Reply<u32>,
    },
    SetPaused {
        actor: Actor,
        paused: bool,
        reply: Reply<()>,
    },
    ClearHits {
        actor: Actor,
        reply: Reply<()>,
    },
    AdjustSkill {
        actor: Actor,
        username: String,
        adjustment: SkillAdjustment,
        reply: Reply<PlayerRecord>,
    },
    AddXp {
        actor: Actor,
        username: String,
        amount: i64,
        reply: Reply<PlayerRecord>,
    },
    ResetXp {
        actor: Actor,
        reply: Reply<usize>,
    },
    ResetSkills {
        actor: Actor,
        reply: Reply<usize>,
    },
    TouchActivity { user: String },
    Snapshot { reply: oneshot::Sender<GameSnapshot> },
}

/// Background task that processes game commands one at a time.
///
/// The worker is the only owner of the session, so every command observes the
/// state left by the previous one.
pub struct GameWorker {
    session: GameSession<PcgRng>,
    store: Arc<dyn PlayerStore + Send + Sync>,
    clock: Arc<dyn Clock>,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
}

impl GameWorker {
    pub fn new(
        session: GameSession<PcgRng>,
        store: Arc<dyn PlayerStore + Send + Sync>,
        clock: Arc<dyn Clock>,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
    ) -> Self {
        info!(
            target: LOG_TARGET,
            phase = session.boss().phase(),
            hp = session.boss().hp(),
            stream_live = session.events().is_stream_live(),
            "game worker initialized"
        );
        Self {
            session,
            store,
            clock,
            command_rx,
            event_bus,
        }
    }

    /// Main worker loop. Ends when every command sender is gone.
    ///
    /// Store calls may block on disk, so the loop blocks too and must run on a
    /// blocking thread such as [`tokio::task::spawn_blocking`].
    pub fn run(mut self) {
        while let Some(cmd) = self.command_rx.blocking_recv() {
            self.handle_command(cmd);
            self.flush();
        }
        debug!(target: LOG_TARGET, "command channel closed, game worker stopping");
    }

    fn handle_command(&mut self, cmd: Command) {
        let now_ms = self.clock.now_ms();
        let store = &*self.store;
        let session = &mut self.session;

        match cmd {
            Command::Action {
                actor,
                action,
                reply,
            } => {
                let result = session.resolve_action(store, &actor, action, now_ms);
                log_rejection("action", &actor.username, &result);
                send(reply, result, "Action");
            }
            Command::ChatCommand { actor, text, reply } => {
                let result = session.resolve_command(store, &actor, &text, now_ms);
                log_rejection("chat_command", &actor.username, &result);
                send(reply, result, "ChatCommand");
            }
            Command::Tribute { tribute, reply } => {
                let result = session.apply_tribute(store, &tribute, now_ms);
                log_rejection("tribute", &tribute.from, &result);
                send(reply, result, "Tribute");
            }
            Command::Tick { reply } => {
                session.tick(store, now_ms);
                if let Some(reply) = reply {
                    send(reply, (), "Tick");
                }
            }
            Command::SetStreamLive { live, reply } => {
                let changed = session.set_stream_live(live, now_ms);
                send(reply, changed, "SetStreamLive");
            }
            Command::StartEvent { kind, reply } => {
                let started = session.start_event(store, kind, now_ms);
                send(reply, started, "StartEvent");
            }
            Command::SetPhase {
                actor,
                phase,
                reply,
            } => {
                let result = session.set_phase(&actor, phase, now_ms);
                log_rejection("set_phase", &actor.username, &result);
                send(reply, result, "SetPhase");
            }
            Command::ApplyDamage {
                actor,
                target,
                amount,
                source,
                reply,
            } => {
                let result = session.apply_damage(store, &actor, &target, amount, &source, now_ms);
                log_rejection("apply_damage", &actor.username, &result);
                send(reply, result, "ApplyDamage");
            }
            Command::ResetBoss { actor, reply } => {
                let result = session.reset_boss(&actor, now_ms);
                log_rejection("reset_boss", &actor.username, &result);
                send(reply, result, "ResetBoss");
            }
            Command::SetHp { actor, hp, reply } => {
                let result = session.set_hp(&actor, hp);
                log_rejection("set_hp", &actor.username, &result);
                send(reply, result, "SetHp");
            }
            Command::SetPaused {
                actor,
                paused,
                reply,
            } => {
                let result = session.set_paused(&actor, paused);
                log_rejection("set_paused", &actor.username, &result);
                send(reply, result, "SetPaused");
            }
            Command::ClearHits { actor, reply } => {
                let result = session.clear_hits(&actor);
                log_rejection("clear_hits", &actor.username, &result);
                send(reply, result, "ClearHits");
            }
            Command::AdjustSkill {
                actor,
                username,
                adjustment,
                reply,
            } => {
                let result = session.adjust_skill(store, &actor, &username, adjustment);
                log_rejection("adjust_skill", &actor.username, &result);
                send(reply, result, "AdjustSkill");
            }
            Command::AddXp {
                actor,
                username,
                amount,
                reply,
            } => {
                let result = session.add_xp(store, &actor, &username, amount);
                log_rejection("add_xp", &actor.username, &result);
                send(reply, result, "AddXp");
            }
            Command::ResetXp { actor, reply } => {
                let result = session.reset_xp(store, &actor);
                log_rejection("reset_xp", &actor.username, &result);
                send(reply, result, "ResetXp");
            }
            Command::ResetSkills { actor, reply } => {
                let result = session.reset_all_skills(store, &actor);
                log_rejection("reset_all_skills", &actor.username, &result);
                send(reply, result, "ResetSkills");
            }
            Command::TouchActivity { user } => {
                session.touch_activity(&user, now_ms);
            }
            Command::Snapshot { reply } => {
                send(reply, snapshot_with_boards(session, store, now_ms), "Snapshot");
            }
        }
    }

    /// Logs and publishes everything the last command produced.
    fn flush(&mut self) {
        let events = self.session.drain_events();
        if events.is_empty() {
            return;
        }

        let snapshot = snapshot_with_boards(&self.session, &*self.store, self.clock.now_ms());
        for event in events {
            log_event(&event);
            if event.broadcasts() {
                let chaos = match &event {
                    SessionEvent::Chaos { effect } => Some(*effect),
                    _ => None,
                };
                let broadcast = StateBroadcast::new(snapshot.clone())
                    .with_toast(event.toast())
                    .with_chaos(chaos);
                self.event_bus.publish(Event::State(Box::new(broadcast)));
            }
            self.event_bus.publish(Event::Session(event));
        }
    }
}

/// Session snapshot plus leaderboards. A failed leaderboard read is logged
/// and leaves the boards empty.
fn snapshot_with_boards(
    session: &GameSession<PcgRng>,
    store: &(dyn PlayerStore + Send + Sync),
    now_ms: u64,
) -> GameSnapshot {
    let snapshot = session.snapshot();
    match Leaderboards::read(store, now_ms) {
        Ok(boards) => snapshot.with_leaderboards(boards),
        Err(err) => {
            warn!(target: LOG_TARGET, error = %err, "leaderboard read failed");
            snapshot
        }
    }
}

fn send<T>(reply: oneshot::Sender<T>, value: T, command: &str) {
    if reply.send(value).is_err() {
        debug!(target: LOG_TARGET, command, "reply channel closed (caller dropped)");
    }
}

fn log_rejection<T>(operation: &str, actor: &str, result: &Result<T, ActionError>) {
    let Err(err) = result else {
        return;
    };
    if err.kind() == ErrorKind::Store {
        warn!(target: LOG_TARGET, operation, actor, error = %err, "store failure, operation dropped");
    } else {
        debug!(
            target: LOG_TARGET,
            operation,
            actor,
            reason = err.reason_code(),
            "operation rejected"
        );
    }
}

fn log_event(event: &SessionEvent) {
    match event {
        SessionEvent::ActionApplied {
            actor,
            action,
            effect,
            xp,
            skill_ups,
        } => debug!(
            target: LOG_TARGET,
            actor = %actor,
            action = %action,
            effect = %effect,
            xp,
            skill_ups,
            "action applied"
        ),
        SessionEvent::TributeApplied {
            actor,
            tribute,
            amount,
            damage,
        } => info!(
            target: LOG_TARGET,
            actor = %actor,
            tribute = %tribute,
            amount,
            damage,
            "tribute applied"
        ),
        SessionEvent::BossDefeated { phase, by } => {
            info!(target: LOG_TARGET, phase, by = %by, "boss defeated")
        }
        SessionEvent::MarkBroken { user, bonus_xp } => {
            info!(target: LOG_TARGET, user = %user, bonus_xp, "mark broken")
        }
        SessionEvent::TotemDestroyed { by } => {
            info!(target: LOG_TARGET, by = %by, "totem destroyed")
        }
        SessionEvent::Chaos { effect } => {
            info!(target: LOG_TARGET, kind = %effect.kind, "chaos effect")
        }
        SessionEvent::EventScheduled { at_ms, in_ms } => {
            info!(target: LOG_TARGET, at_ms, in_ms, "next event scheduled")
        }
        SessionEvent::EventStarted { kind, duration_ms } => {
            info!(target: LOG_TARGET, kind = %kind, duration_ms, "event started")
        }
        SessionEvent::EventEnded { kind, reason } => {
            info!(target: LOG_TARGET, kind = %kind, reason = %reason, "event ended")
        }
        SessionEvent::StreamChanged { live } => {
            info!(target: LOG_TARGET, live, "stream liveness changed")
        }
        SessionEvent::MarkFallbackFailed { error } => {
            warn!(target: LOG_TARGET, error = %error, "mark target lookup failed")
        }
        other => {
            if let Some(toast) = other.toast() {
                info!(target: LOG_TARGET, "{toast}");
            } else {
                debug!(target: LOG_TARGET, event = ?other, "session event");
            }
        }
    }
}
