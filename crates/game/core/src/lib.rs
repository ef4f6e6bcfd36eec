//! Deterministic boss-fight rules shared by the runtime and offline tools.
//!
//! `boss-core` defines the canonical rules (progression curves, the boss phase
//! machine, timed events, combat resolution) and exposes pure APIs with no I/O.
//! All state mutation flows through [`engine::GameSession`]; randomness and the
//! player store are injected through [`env`], and everything that happened is
//! reported back as [`notice::SessionEvent`]s.
pub mod auth;
pub mod chaos;
pub mod combat;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod events;
pub mod notice;
pub mod progression;
pub mod state;

pub use auth::{Actor, AdminCommand, Role};
pub use chaos::{ChaosEffect, ChaosKind};
pub use combat::{
    ActionEffect, ActionKind, ActionOutcome, ActionReport, CooldownSlot, Modifier, Multiplier,
};
pub use config::{
    BossConfig, CombatConfig, EventConfig, GameConfig, ProgressionConfig, TributeConfig,
};
pub use engine::{
    GameSession, SkillAdjustment, Tribute, TributeKind, TributeReport, donation_phase_multiplier,
};
pub use env::{PcgRng, PlayerStore, RngSource, SequenceRng, StoreError};
pub use error::{ActionError, ErrorKind};
pub use events::{EndReason, EventEngine, EventKind, EventMeta, MarkState, Timer, TotemState};
pub use notice::SessionEvent;
pub use progression::{
    SkillAward, XpAward, award_skill, award_xp, level_for_xp, required_skill_tries,
};
pub use state::{
    BossState, DamageEntry, EventView, GameSnapshot, HitEntry, Leaderboards, PhaseWinner,
    PlayerRecord, XpEntry, day_start_ms, normalize_username,
};
