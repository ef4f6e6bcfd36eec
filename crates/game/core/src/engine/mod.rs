//! The session aggregate and every operation that mutates it.
//!
//! [`GameSession`] owns the boss, the event engine and the RNG. Operations that
//! touch the player store follow one discipline: read the record, apply the
//! operation to a working copy of the session, write the finished record back,
//! and only then replace the live session with the working copy. A store
//! failure at any point leaves the live session exactly as it was.

mod admin;
mod resolver;
mod tribute;

pub use admin::SkillAdjustment;
pub use tribute::{Tribute, TributeKind, TributeReport, donation_phase_multiplier};

use std::mem;

use crate::chaos::ChaosEffect;
use crate::config::GameConfig;
use crate::env::{PlayerStore, RngSource, StoreError};
use crate::error::ActionError;
use crate::events::{EventEngine, EventKind, MARK_FALLBACK_LIMIT};
use crate::notice::SessionEvent;
use crate::state::{BossState, GameSnapshot, PhaseWinner, PlayerRecord};

#[derive(Clone, Debug)]
pub struct GameSession<R> {
    config: GameConfig,
    boss: BossState,
    events: EventEngine<R>,
    chaos_last: Option<ChaosEffect>,
    outbox: Vec<SessionEvent>,
}

impl<R: RngSource + Clone> GameSession<R> {
    /// Creates a session at phase 1. `config` is normalized first.
    pub fn new(config: GameConfig, rng: R, now_ms: u64) -> Self {
        let config = config.normalized();
        Self {
            boss: BossState::new(&config.boss, now_ms),
            events: EventEngine::new(config.events.clone(), rng),
            config,
            chaos_last: None,
            outbox: Vec::new(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn boss(&self) -> &BossState {
        &self.boss
    }

    pub fn events(&self) -> &EventEngine<R> {
        &self.events
    }

    pub fn chaos_last(&self) -> Option<ChaosEffect> {
        self.chaos_last
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::capture(&self.boss, &self.events, self.chaos_last)
    }

    /// Takes everything that happened since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        mem::take(&mut self.outbox)
    }

    // ========================================================================
    // Event engine
    // ========================================================================

    /// Advances the event scheduler. Never fails; a store error while picking
    /// a mark target is reported as [`SessionEvent::MarkFallbackFailed`].
    pub fn tick<S: PlayerStore + ?Sized>(&mut self, store: &S, now_ms: u64) {
        let phase = self.boss.phase();
        let mut lookup_error: Option<StoreError> = None;
        let mut out = Vec::new();
        self.events.tick(
            now_ms,
            phase,
            || known_players(store, &mut lookup_error),
            &mut out,
        );
        if let Some(err) = lookup_error {
            self.outbox.push(SessionEvent::MarkFallbackFailed {
                error: err.to_string(),
            });
        }
        self.outbox.extend(out);
    }

    /// Pauses or resumes every event timer. Returns false if `live` was already set.
    pub fn set_stream_live(&mut self, live: bool, now_ms: u64) -> bool {
        let mut out = Vec::new();
        let changed = self
            .events
            .set_stream_live(live, now_ms, self.boss.phase(), &mut out);
        self.outbox.extend(out);
        changed
    }

    /// Starts `kind` immediately if no event is running.
    pub fn start_event<S: PlayerStore + ?Sized>(
        &mut self,
        store: &S,
        kind: EventKind,
        now_ms: u64,
    ) -> bool {
        let phase = self.boss.phase();
        let mut lookup_error: Option<StoreError> = None;
        let mut out = Vec::new();
        let started = self.events.start_event(
            kind,
            now_ms,
            phase,
            || known_players(store, &mut lookup_error),
            &mut out,
        );
        if let Some(err) = lookup_error {
            self.outbox.push(SessionEvent::MarkFallbackFailed {
                error: err.to_string(),
            });
        }
        self.outbox.extend(out);
        started
    }

    pub fn touch_activity(&mut self, user: &str, now_ms: u64) {
        self.events.touch_activity(user, now_ms);
    }

    // ========================================================================
    // Shared helpers
    // ========================================================================

    /// Records winners and announces the cleared phase on the working copy.
    fn finish_defeat(&mut self, phase: u32, by: &str, winners: Vec<PhaseWinner>) {
        self.boss.record_winners(winners);
        self.outbox.push(SessionEvent::BossDefeated {
            phase,
            by: by.to_owned(),
        });
    }
}

fn known_players<S: PlayerStore + ?Sized>(
    store: &S,
    lookup_error: &mut Option<StoreError>,
) -> Vec<String> {
    match store.known_usernames(MARK_FALLBACK_LIMIT) {
        Ok(names) => names,
        Err(err) => {
            *lookup_error = Some(err);
            Vec::new()
        }
    }
}

/// Top players by XP once `updated` has been written.
///
/// Queried before the write lands, so the caller's fresh record is merged in
/// by hand. This is the all-time leaderboard, not per-phase contribution.
fn phase_winners<S: PlayerStore + ?Sized>(
    store: &S,
    updated: Option<&PlayerRecord>,
) -> Result<Vec<PhaseWinner>, ActionError> {
    let mut top = store.top_by_xp(GameConfig::PHASE_WINNERS)?;
    if let Some(record) = updated {
        top.retain(|row| row.username != record.username);
        top.push(record.clone());
    }
    top.sort_by(|a, b| b.xp.cmp(&a.xp).then_with(|| a.username.cmp(&b.username)));
    top.truncate(GameConfig::PHASE_WINNERS);
    Ok(top
        .into_iter()
        .map(|row| PhaseWinner {
            username: row.username,
            xp: row.xp,
            level: row.level,
            skill: row.skill,
        })
        .collect())
}
