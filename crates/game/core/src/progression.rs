//! XP levels and skill curves.
//!
//! Both curves are pure. Levels walk a threshold list that starts at
//! [`FIRST_LEVEL_XP`] and grows by 15% per level, floored in floating point
//! so `100 × 1.15` lands on 114. Skill levels need
//! `base_tries × growth^(skill - skill_start)` tries each.

use crate::config::{GameConfig, ProgressionConfig};

/// XP needed to leave level 1.
pub const FIRST_LEVEL_XP: u64 = 100;

const LEVEL_GROWTH: f64 = 1.15;

const MAX_REQUIRED_TRIES: f64 = 2_000_000_000.0;

/// New XP total and the level it maps to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct XpAward {
    pub xp: u64,
    pub level: u32,
}

/// Result of [`award_skill`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkillAward {
    pub skill: u32,
    pub skill_tries: u32,
    pub skill_ups: u32,
}

pub fn level_for_xp(xp: u64) -> u32 {
    let mut level = 1;
    let mut need = FIRST_LEVEL_XP;
    let mut remain = xp;
    while remain >= need && level < GameConfig::MAX_LEVEL {
        remain -= need;
        level += 1;
        need = next_level_need(need);
    }
    level
}

fn next_level_need(need: u64) -> u64 {
    let next = (need as f64 * LEVEL_GROWTH).floor();
    if next >= u64::MAX as f64 {
        u64::MAX
    } else {
        (next as u64).max(need)
    }
}

/// Adds a signed XP delta, clamping the total into `[0, MAX_XP]`.
pub fn award_xp(current: u64, delta: i64) -> XpAward {
    let xp = if delta.is_negative() {
        current.saturating_sub(delta.unsigned_abs())
    } else {
        current.saturating_add(delta as u64)
    }
    .min(GameConfig::MAX_XP);
    XpAward {
        xp,
        level: level_for_xp(xp),
    }
}

/// Tries needed to advance from `skill` to `skill + 1`.
pub fn required_skill_tries(skill: u32, config: &ProgressionConfig) -> u32 {
    let exponent = skill.saturating_sub(config.skill_start);
    let raw = f64::from(config.skill_base_tries) * config.skill_growth.powi(exponent as i32);
    if !raw.is_finite() {
        return MAX_REQUIRED_TRIES as u32;
    }
    raw.round().clamp(1.0, MAX_REQUIRED_TRIES) as u32
}

/// Adds `add_tries` and levels skill up as many times as the tries cover.
pub fn award_skill(
    skill: u32,
    skill_tries: u32,
    add_tries: u32,
    config: &ProgressionConfig,
) -> SkillAward {
    let mut skill = skill.clamp(config.skill_start, GameConfig::MAX_SKILL);
    let mut tries = u64::from(skill_tries) + u64::from(add_tries);
    let mut skill_ups = 0;

    while skill < GameConfig::MAX_SKILL {
        let need = u64::from(required_skill_tries(skill, config));
        if tries < need {
            break;
        }
        tries -= need;
        skill += 1;
        skill_ups += 1;
    }

    SkillAward {
        skill,
        skill_tries: tries.min(u64::from(u32::MAX)) as u32,
        skill_ups,
    }
}
