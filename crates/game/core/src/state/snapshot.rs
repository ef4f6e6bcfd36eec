use super::{BossState, HitEntry, Leaderboards, PhaseWinner};
use crate::chaos::ChaosEffect;
use crate::env::RngSource;
use crate::events::{ActiveEvent, EventEngine, EventKind, EventMeta, Timer};

/// Read-only view of an active event, with its presentation strings.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventView {
    pub kind: EventKind,
    pub title: String,
    pub description: String,
    pub started_at_ms: u64,
    pub duration_ms: u64,
    pub timer: Timer,
    pub meta: EventMeta,
}

impl From<&ActiveEvent> for EventView {
    fn from(event: &ActiveEvent) -> Self {
        Self {
            kind: event.kind,
            title: event.kind.title().to_owned(),
            description: event.kind.description().to_owned(),
            started_at_ms: event.started_at_ms,
            duration_ms: event.duration_ms,
            timer: event.timer,
            meta: event.meta.clone(),
        }
    }
}

/// Everything viewers need to render the fight.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameSnapshot {
    pub boss_hp: u32,
    pub boss_max_hp: u32,
    pub phase: u32,
    pub paused: bool,
    pub last_hits: Vec<HitEntry>,
    pub phase_winners: Vec<PhaseWinner>,
    pub defeated_phase: Option<u32>,
    pub phase_start_ms: u64,
    pub stream_live: bool,
    pub active_event: Option<EventView>,
    pub next_event: Option<Timer>,
    pub last_event: Option<EventKind>,
    pub chaos_last: Option<ChaosEffect>,
    /// Filled by whoever holds the store; empty straight out of the session.
    pub leaderboards: Leaderboards,
}

impl GameSnapshot {
    pub fn capture<R: RngSource>(
        boss: &BossState,
        events: &EventEngine<R>,
        chaos_last: Option<ChaosEffect>,
    ) -> Self {
        Self {
            boss_hp: boss.hp(),
            boss_max_hp: boss.max_hp(),
            phase: boss.phase(),
            paused: boss.is_paused(),
            last_hits: boss.last_hits().to_vec(),
            phase_winners: boss.phase_winners().to_vec(),
            defeated_phase: boss.defeated_phase(),
            phase_start_ms: boss.phase_start_ms(),
            stream_live: events.is_stream_live(),
            active_event: events.active().map(EventView::from),
            next_event: events.schedule(),
            last_event: events.last_kind(),
            chaos_last,
            leaderboards: Leaderboards::default(),
        }
    }

    #[must_use]
    pub fn with_leaderboards(mut self, leaderboards: Leaderboards) -> Self {
        self.leaderboards = leaderboards;
        self
    }
}
