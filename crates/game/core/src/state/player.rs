use crate::combat::CooldownSlot;
use super::day_start_ms;
use crate::config::{GameConfig, ProgressionConfig};

/// Username used when a caller supplies nothing usable.
pub const UNKNOWN_USER: &str = "unknown";

/// Trims, truncates to [`GameConfig::MAX_USERNAME_LEN`] characters, and maps
/// empty input to [`UNKNOWN_USER`].
pub fn normalize_username(raw: &str) -> String {
    normalize_username_or(raw, UNKNOWN_USER)
}

/// Like [`normalize_username`] with a caller-chosen fallback.
pub fn normalize_username_or(raw: &str, fallback: &str) -> String {
    let trimmed: String = raw
        .trim()
        .chars()
        .take(GameConfig::MAX_USERNAME_LEN)
        .collect();
    if trimmed.is_empty() {
        fallback.to_owned()
    } else {
        trimmed
    }
}

/// Per-player progression and cooldown bookkeeping, owned by the player store.
///
/// Timestamps are epoch milliseconds; `0` means "never".
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerRecord {
    pub username: String,
    pub xp: u64,
    pub level: u32,
    pub skill: u32,
    pub skill_tries: u32,
    pub last_attack_ms: u64,
    pub last_heal_ms: u64,
    pub last_ue_ms: u64,
    /// Last attack or charged attack, used by the exhaust event.
    pub last_offensive_ms: u64,
    /// Start of the day `damage_today` belongs to.
    pub damage_day_ms: u64,
    /// Boss damage dealt on `damage_day_ms`.
    pub damage_today: u64,
}

impl PlayerRecord {
    /// Fresh record at level 1 and the configured skill floor.
    pub fn new(username: impl Into<String>, progression: &ProgressionConfig) -> Self {
        Self {
            username: username.into(),
            xp: 0,
            level: 1,
            skill: progression.skill_start,
            skill_tries: 0,
            last_attack_ms: 0,
            last_heal_ms: 0,
            last_ue_ms: 0,
            last_offensive_ms: 0,
            damage_day_ms: 0,
            damage_today: 0,
        }
    }

    pub fn last_used_ms(&self, slot: CooldownSlot) -> u64 {
        match slot {
            CooldownSlot::Attack => self.last_attack_ms,
            CooldownSlot::Heal => self.last_heal_ms,
            CooldownSlot::Ue => self.last_ue_ms,
        }
    }

    /// Adds boss damage to today's tally, starting over on a new day.
    pub fn record_damage(&mut self, amount: u32, now_ms: u64) {
        let day = day_start_ms(now_ms);
        if self.damage_day_ms != day {
            self.damage_day_ms = day;
            self.damage_today = 0;
        }
        self.damage_today = self.damage_today.saturating_add(u64::from(amount));
    }

    /// Damage counted for the day starting at `day_start_ms`.
    pub fn damage_since(&self, day_start_ms: u64) -> u64 {
        if self.damage_day_ms >= day_start_ms {
            self.damage_today
        } else {
            0
        }
    }

    /// Clears XP, level and every cooldown stamp. Skill is kept.
    pub fn reset_progress(&mut self) {
        self.xp = 0;
        self.level = 1;
        self.last_attack_ms = 0;
        self.last_heal_ms = 0;
        self.last_ue_ms = 0;
        self.last_offensive_ms = 0;
    }

    pub fn mark_used(&mut self, slot: CooldownSlot, now_ms: u64) {
        match slot {
            CooldownSlot::Attack => self.last_attack_ms = now_ms,
            CooldownSlot::Heal => self.last_heal_ms = now_ms,
            CooldownSlot::Ue => self.last_ue_ms = now_ms,
        }
    }
}
