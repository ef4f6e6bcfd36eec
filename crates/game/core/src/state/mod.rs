//! Authoritative boss and player state.
//!
//! [`BossState`] is owned by the session; [`PlayerRecord`]s are owned by the
//! player store and only passed through. [`GameSnapshot`] is the read-only view
//! handed to broadcasters.
mod boss;
mod leaderboard;
mod player;
mod snapshot;

pub use boss::{BossState, DamageReport, HitEntry, PhaseWinner, SYSTEM_ACTOR};
pub use leaderboard::{
    DamageEntry, LEADERBOARD_SIZE, Leaderboards, XpEntry, day_start_ms, rank_hitters,
};
pub use player::{PlayerRecord, UNKNOWN_USER, normalize_username, normalize_username_or};
pub use snapshot::{EventView, GameSnapshot};
