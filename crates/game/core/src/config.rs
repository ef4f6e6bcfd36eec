//! Game configuration constants and tunable parameters.
//!
//! Every tunable lives in one of the grouped structs below. Defaults match the
//! values the live deployment has been running with; [`GameConfig::normalized`]
//! clamps anything loaded from the outside into its supported range.

/// Top-level configuration for a [`crate::GameSession`].
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    pub boss: BossConfig,
    pub progression: ProgressionConfig,
    pub combat: CombatConfig,
    pub events: EventConfig,
    pub tribute: TributeConfig,
}

impl GameConfig {
    // ===== compile-time constants =====
    /// Number of entries kept in the recent-hit ring.
    pub const HIT_HISTORY: usize = 10;
    /// Number of players snapshotted when a phase is cleared.
    pub const PHASE_WINNERS: usize = 3;
    /// Upper bound for a single damage or heal amount.
    pub const MAX_HIT_AMOUNT: u32 = 999_999;
    /// Upper bound for total XP.
    pub const MAX_XP: u64 = 2_000_000_000;
    /// Upper bound for player level.
    pub const MAX_LEVEL: u32 = 999;
    /// Upper bound for player skill.
    pub const MAX_SKILL: u32 = 9999;
    /// Maximum username length after normalization.
    pub const MAX_USERNAME_LEN: usize = 40;

    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy with every field clamped into its supported range.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            boss: self.boss.normalized(),
            progression: self.progression.normalized(),
            combat: self.combat.normalized(),
            events: self.events.normalized(),
            tribute: self.tribute.normalized(),
        }
    }
}

/// Boss health and phase scaling.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BossConfig {
    /// Max HP of phase 1.
    pub base_hp: u32,
    /// Extra max HP added per phase above 1.
    pub phase_hp_step: u32,
}

impl BossConfig {
    pub const DEFAULT_BASE_HP: u32 = 5000;
    pub const DEFAULT_PHASE_HP_STEP: u32 = 2000;

    fn normalized(&self) -> Self {
        Self {
            base_hp: self.base_hp.clamp(1, 1_000_000_000),
            phase_hp_step: self.phase_hp_step.min(1_000_000_000),
        }
    }
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            base_hp: Self::DEFAULT_BASE_HP,
            phase_hp_step: Self::DEFAULT_PHASE_HP_STEP,
        }
    }
}

/// Skill curve parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProgressionConfig {
    /// Skill floor; new players start here.
    pub skill_start: u32,
    /// Tries required to leave `skill_start`.
    pub skill_base_tries: u32,
    /// Geometric growth of required tries per skill level. Must be > 1.01.
    pub skill_growth: f64,
    /// Tries granted by one successful offensive action.
    pub skill_tries_per_attack: u32,
}

impl ProgressionConfig {
    pub const MIN_GROWTH: f64 = 1.01;

    fn normalized(&self) -> Self {
        let growth = if self.skill_growth.is_finite() {
            self.skill_growth.max(Self::MIN_GROWTH)
        } else {
            Self::default().skill_growth
        };
        Self {
            skill_start: self.skill_start.clamp(1, GameConfig::MAX_SKILL),
            skill_base_tries: self.skill_base_tries.max(1),
            skill_growth: growth,
            skill_tries_per_attack: self.skill_tries_per_attack.max(1),
        }
    }
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            skill_start: 1,
            skill_base_tries: 40,
            skill_growth: 1.16,
            skill_tries_per_attack: 1,
        }
    }
}

/// Chat command damage, XP and cooldowns.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatConfig {
    pub attack_damage: u32,
    pub subscriber_attack_bonus: u32,
    pub heal_amount: u32,
    /// Charged attack deals this many times the attack base.
    pub charged_multiplier: u32,
    pub attack_xp: u32,
    pub charged_xp: u32,
    pub heal_xp: u32,
    pub totem_xp: u32,
    pub attack_cooldown_ms: u64,
    pub heal_cooldown_ms: u64,
    pub charged_cooldown_ms: u64,
}

impl CombatConfig {
    fn normalized(&self) -> Self {
        Self {
            attack_damage: self.attack_damage.clamp(1, 9999),
            subscriber_attack_bonus: self.subscriber_attack_bonus.min(9999),
            heal_amount: self.heal_amount.min(GameConfig::MAX_HIT_AMOUNT),
            charged_multiplier: self.charged_multiplier.clamp(1, 100),
            attack_xp: self.attack_xp.min(100_000),
            charged_xp: self.charged_xp.min(100_000),
            heal_xp: self.heal_xp.min(100_000),
            totem_xp: self.totem_xp.min(100_000),
            attack_cooldown_ms: self.attack_cooldown_ms.min(DAY_MS),
            heal_cooldown_ms: self.heal_cooldown_ms.min(DAY_MS),
            charged_cooldown_ms: self.charged_cooldown_ms.min(DAY_MS),
        }
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            attack_damage: 5,
            subscriber_attack_bonus: 2,
            heal_amount: 15,
            charged_multiplier: 3,
            attack_xp: 2,
            charged_xp: 6,
            heal_xp: 5,
            totem_xp: 2,
            attack_cooldown_ms: 10_000,
            heal_cooldown_ms: 30_000,
            charged_cooldown_ms: 60_000,
        }
    }
}

const HOUR_MS: u64 = 3_600_000;
pub const DAY_MS: u64 = 24 * HOUR_MS;

/// Random event scheduler and modifier strengths.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventConfig {
    pub min_duration_ms: u64,
    pub max_duration_ms: u64,
    pub break_min_ms: u64,
    pub break_max_ms: u64,
    /// Duration used by shield and roleswap instead of the random range.
    pub fixed_duration_ms: u64,
    pub shield_damage_mult: f64,
    pub mark_charge_target: u32,
    pub mark_bonus_xp: u32,
    pub vulnerable_damage_mult: f64,
    pub mark_active_window_ms: u64,
    pub exhaust_window_ms: u64,
    pub exhausted_damage_mult: f64,
    pub exhausted_xp_mult: f64,
    pub totem_base_hp: u32,
    pub totem_hp_per_phase: u32,
    pub totem_boss_reduction: f64,
    pub totem_xp_extra: u32,
    pub stream_live_default: bool,
}

impl EventConfig {
    fn normalized(&self) -> Self {
        let min_duration_ms = self.min_duration_ms.clamp(1000, HOUR_MS);
        let break_min_ms = self.break_min_ms.min(HOUR_MS);
        Self {
            min_duration_ms,
            max_duration_ms: self.max_duration_ms.clamp(1000, HOUR_MS).max(min_duration_ms),
            break_min_ms,
            break_max_ms: self.break_max_ms.min(HOUR_MS).max(break_min_ms),
            fixed_duration_ms: self.fixed_duration_ms.clamp(1000, HOUR_MS),
            shield_damage_mult: clamp_mult(self.shield_damage_mult, 0.0, 10.0, 0.2),
            mark_charge_target: self.mark_charge_target.clamp(1, 100),
            mark_bonus_xp: self.mark_bonus_xp.min(100_000),
            vulnerable_damage_mult: clamp_mult(self.vulnerable_damage_mult, 0.0, 10.0, 1.5),
            mark_active_window_ms: self.mark_active_window_ms.clamp(1000, DAY_MS),
            exhaust_window_ms: self.exhaust_window_ms.clamp(1000, DAY_MS),
            exhausted_damage_mult: clamp_mult(self.exhausted_damage_mult, 0.0, 10.0, 0.5),
            exhausted_xp_mult: clamp_mult(self.exhausted_xp_mult, 0.0, 10.0, 0.5),
            totem_base_hp: self.totem_base_hp.clamp(1, 10_000_000),
            totem_hp_per_phase: self.totem_hp_per_phase.min(10_000_000),
            totem_boss_reduction: clamp_mult(self.totem_boss_reduction, 0.0, 1.0, 0.7),
            totem_xp_extra: self.totem_xp_extra.min(100_000),
            stream_live_default: self.stream_live_default,
        }
    }
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            min_duration_ms: 120_000,
            max_duration_ms: 300_000,
            break_min_ms: 30_000,
            break_max_ms: 120_000,
            fixed_duration_ms: 300_000,
            shield_damage_mult: 0.2,
            mark_charge_target: 3,
            mark_bonus_xp: 100,
            vulnerable_damage_mult: 1.5,
            mark_active_window_ms: 10 * 60 * 1000,
            exhaust_window_ms: 180_000,
            exhausted_damage_mult: 0.5,
            exhausted_xp_mult: 0.5,
            totem_base_hp: 120,
            totem_hp_per_phase: 40,
            totem_boss_reduction: 0.7,
            totem_xp_extra: 10,
            stream_live_default: true,
        }
    }
}

/// Damage and XP granted by platform tributes (follows, subs, donations).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TributeConfig {
    pub follow_damage: u32,
    pub sub_damage: u32,
    pub donate_damage_mult: f64,
    pub follow_xp: u32,
    pub sub_xp: u32,
    /// Flat part of the donation XP grant.
    pub donation_base_xp: u32,
    /// Cap on the damage-derived part of the donation XP grant.
    pub donation_xp_cap: u32,
    pub chaos_enabled: bool,
    /// Minimum donation amount that rolls a chaos effect.
    pub chaos_threshold: u32,
}

impl TributeConfig {
    fn normalized(&self) -> Self {
        Self {
            follow_damage: self.follow_damage.min(GameConfig::MAX_HIT_AMOUNT),
            sub_damage: self.sub_damage.min(GameConfig::MAX_HIT_AMOUNT),
            donate_damage_mult: clamp_mult(self.donate_damage_mult, 0.0, 1000.0, 2.5),
            follow_xp: self.follow_xp.min(100_000),
            sub_xp: self.sub_xp.min(100_000),
            donation_base_xp: self.donation_base_xp.min(100_000),
            donation_xp_cap: self.donation_xp_cap.min(100_000),
            chaos_enabled: self.chaos_enabled,
            chaos_threshold: self.chaos_threshold,
        }
    }
}

impl Default for TributeConfig {
    fn default() -> Self {
        Self {
            follow_damage: 20,
            sub_damage: 150,
            donate_damage_mult: 2.5,
            follow_xp: 10,
            sub_xp: 50,
            donation_base_xp: 20,
            donation_xp_cap: 100,
            chaos_enabled: true,
            chaos_threshold: 10,
        }
    }
}

fn clamp_mult(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}
