//! Top-XP and damage-today leaderboards shown next to the boss.

use super::PlayerRecord;
use crate::config::DAY_MS;
use crate::env::{PlayerStore, StoreError};

/// Rows per leaderboard.
pub const LEADERBOARD_SIZE: usize = 5;

/// Start of the UTC day containing `now_ms`. Daily damage tallies reset here.
pub const fn day_start_ms(now_ms: u64) -> u64 {
    now_ms - now_ms % DAY_MS
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct XpEntry {
    pub username: String,
    pub xp: u64,
    pub level: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageEntry {
    pub username: String,
    pub damage: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Leaderboards {
    pub top_xp: Vec<XpEntry>,
    pub top_damage: Vec<DamageEntry>,
}

impl Leaderboards {
    /// Reads both boards; damage counts only what was dealt since the start
    /// of the current day.
    pub fn read<S: PlayerStore + ?Sized>(store: &S, now_ms: u64) -> Result<Self, StoreError> {
        let day_start = day_start_ms(now_ms);
        let top_xp = store
            .top_by_xp(LEADERBOARD_SIZE)?
            .into_iter()
            .map(|record| XpEntry {
                username: record.username,
                xp: record.xp,
                level: record.level,
            })
            .collect();
        let top_damage = store
            .top_hitters_since(day_start, LEADERBOARD_SIZE)?
            .into_iter()
            .map(|record| DamageEntry {
                damage: record.damage_since(day_start),
                username: record.username,
            })
            .collect();
        Ok(Self { top_xp, top_damage })
    }
}

/// Records with damage dealt since `day_start_ms`, highest first, ties by
/// username. Shared by store implementations.
pub fn rank_hitters<'a>(
    records: impl IntoIterator<Item = &'a PlayerRecord>,
    day_start_ms: u64,
    limit: usize,
) -> Vec<PlayerRecord> {
    let mut ranked: Vec<PlayerRecord> = records
        .into_iter()
        .filter(|record| record.damage_since(day_start_ms) > 0)
        .cloned()
        .collect();
    ranked.sort_by(|a, b| {
        b.damage_since(day_start_ms)
            .cmp(&a.damage_since(day_start_ms))
            .then_with(|| a.username.cmp(&b.username))
    });
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProgressionConfig;

    fn hitter(name: &str, damage: u32, at_ms: u64) -> PlayerRecord {
        let mut record = PlayerRecord::new(name, &ProgressionConfig::default());
        record.record_damage(damage, at_ms);
        record
    }

    #[test]
    fn day_starts_at_utc_midnight() {
        assert_eq!(day_start_ms(0), 0);
        assert_eq!(day_start_ms(DAY_MS - 1), 0);
        assert_eq!(day_start_ms(3 * DAY_MS + 5), 3 * DAY_MS);
    }

    #[test]
    fn yesterday_damage_does_not_rank() {
        let today = 10 * DAY_MS;
        let rows = [
            hitter("old", 900, today - 1),
            hitter("bea", 40, today + 10),
            hitter("abe", 40, today + 20),
            hitter("cat", 70, today + 30),
        ];
        let names: Vec<_> = rank_hitters(&rows, today, 5)
            .into_iter()
            .map(|r| r.username)
            .collect();
        assert_eq!(names, vec!["cat", "abe", "bea"]);
    }
}
