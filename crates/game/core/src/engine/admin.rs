//! Administrative overrides. Every operation checks the caller's role first.

use strum::{Display, EnumString};

use super::{GameSession, phase_winners};
use crate::auth::{Actor, AdminCommand};
use crate::config::GameConfig;
use crate::env::{PlayerStore, RngSource};
use crate::error::ActionError;
use crate::notice::SessionEvent;
use crate::progression::award_xp;
use crate::state::{DamageReport, PlayerRecord, normalize_username};

/// Highest phase an admin may force.
pub const MAX_FORCED_PHASE: u32 = 9999;

/// Largest single XP grant an admin may hand out.
pub const MAX_XP_GRANT: u32 = 1_000_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SkillAdjustment {
    Inc,
    Dec,
    Reset,
}

impl SkillAdjustment {
    fn apply(self, skill: u32, skill_start: u32) -> u32 {
        match self {
            Self::Inc => skill.saturating_add(1).clamp(skill_start, GameConfig::MAX_SKILL),
            Self::Dec => skill.saturating_sub(1).max(skill_start),
            Self::Reset => skill_start,
        }
    }
}

fn authorize(actor: &Actor, command: AdminCommand) -> Result<(), ActionError> {
    if actor.role.can_run(command) {
        Ok(())
    } else {
        Err(ActionError::Forbidden {
            actor: actor.username.clone(),
            command: command.name(),
        })
    }
}

impl<R: RngSource + Clone> GameSession<R> {
    /// Forces the boss into phase `phase` (clamped to `[1, 9999]`) with full HP.
    pub fn set_phase(&mut self, actor: &Actor, phase: u32, now_ms: u64) -> Result<(), ActionError> {
        authorize(actor, AdminCommand::Phase)?;
        let phase = phase.clamp(1, MAX_FORCED_PHASE);
        self.boss.set_phase(phase);
        self.boss.restart_phase_clock(now_ms);
        self.outbox.push(SessionEvent::PhaseForced {
            phase,
            by: actor.username.clone(),
        });
        Ok(())
    }

    /// Deals `amount` to the boss on behalf of `target`, outside every
    /// cooldown and multiplier. Negative amounts deal nothing.
    ///
    /// Only the leaderboard is read, and only on defeat; a failed read
    /// leaves the boss untouched.
    pub fn apply_damage<S: PlayerStore + ?Sized>(
        &mut self,
        store: &S,
        actor: &Actor,
        target: &str,
        amount: i64,
        source: &str,
        now_ms: u64,
    ) -> Result<DamageReport, ActionError> {
        authorize(actor, AdminCommand::BossHit)?;
        let target = normalize_username(target);
        let amount = amount.clamp(0, i64::from(GameConfig::MAX_HIT_AMOUNT)) as u32;

        let mut next = self.clone();
        let hit = next.boss.apply_damage(&target, amount, source, now_ms);
        next.outbox.push(SessionEvent::DamageForced {
            target: target.clone(),
            amount: hit.amount,
            by: actor.username.clone(),
        });
        if let Some(phase) = hit.defeated_phase {
            let winners = phase_winners(store, None)?;
            next.finish_defeat(phase, &target, winners);
        }
        *self = next;
        Ok(hit)
    }

    /// Phase 1, full HP.
    pub fn reset_boss(&mut self, actor: &Actor, now_ms: u64) -> Result<(), ActionError> {
        authorize(actor, AdminCommand::Reset)?;
        self.boss.reset(&actor.username, now_ms);
        self.outbox.push(SessionEvent::BossReset {
            by: actor.username.clone(),
        });
        Ok(())
    }

    /// Sets HP directly, clamped to `[0, max_hp]`. Zero does not clear the phase.
    pub fn set_hp(&mut self, actor: &Actor, hp: i64) -> Result<u32, ActionError> {
        authorize(actor, AdminCommand::SetHp)?;
        let hp = hp.clamp(0, i64::from(self.boss.max_hp())) as u32;
        self.boss.set_hp(hp);
        self.outbox.push(SessionEvent::HpSet {
            hp: self.boss.hp(),
            by: actor.username.clone(),
        });
        Ok(self.boss.hp())
    }

    pub fn set_paused(&mut self, actor: &Actor, paused: bool) -> Result<(), ActionError> {
        let command = if paused {
            AdminCommand::Pause
        } else {
            AdminCommand::Resume
        };
        authorize(actor, command)?;
        self.boss.set_paused(paused);
        self.outbox.push(SessionEvent::PauseChanged {
            paused,
            by: actor.username.clone(),
        });
        Ok(())
    }

    pub fn clear_hits(&mut self, actor: &Actor) -> Result<(), ActionError> {
        authorize(actor, AdminCommand::ClearHits)?;
        self.boss.clear_hits();
        self.outbox.push(SessionEvent::HitsCleared {
            by: actor.username.clone(),
        });
        Ok(())
    }

    /// Adjusts a known player's skill and resets their skill tries.
    pub fn adjust_skill<S: PlayerStore + ?Sized>(
        &mut self,
        store: &S,
        actor: &Actor,
        username: &str,
        adjustment: SkillAdjustment,
    ) -> Result<PlayerRecord, ActionError> {
        authorize(actor, AdminCommand::Skill)?;
        let username = normalize_username(username);
        let mut record = store
            .get(&username)?
            .ok_or_else(|| ActionError::UnknownPlayer(username.clone()))?;

        record.skill = adjustment.apply(record.skill, self.config.progression.skill_start);
        record.skill_tries = 0;
        store.upsert(&record)?;

        self.outbox.push(SessionEvent::SkillAdjusted {
            username,
            skill: record.skill,
            by: actor.username.clone(),
        });
        Ok(record)
    }

    /// Grants `amount` XP (capped at [`MAX_XP_GRANT`]) and recomputes the
    /// level. Unknown players are created.
    pub fn add_xp<S: PlayerStore + ?Sized>(
        &mut self,
        store: &S,
        actor: &Actor,
        username: &str,
        amount: i64,
    ) -> Result<PlayerRecord, ActionError> {
        authorize(actor, AdminCommand::AddXp)?;
        if username.trim().is_empty() {
            return Err(ActionError::MissingUsername);
        }
        let grant = amount.clamp(0, i64::from(MAX_XP_GRANT));
        if grant == 0 {
            return Err(ActionError::InvalidAmount(amount));
        }

        let username = normalize_username(username);
        let mut record = store
            .get(&username)?
            .unwrap_or_else(|| PlayerRecord::new(username.clone(), &self.config.progression));
        let xp = award_xp(record.xp, grant);
        record.xp = xp.xp;
        record.level = xp.level;
        store.upsert(&record)?;

        self.outbox.push(SessionEvent::XpAdded {
            username,
            xp: grant as u32,
            by: actor.username.clone(),
        });
        Ok(record)
    }

    /// Drops every player back to level 1 with no XP and no cooldowns.
    pub fn reset_xp<S: PlayerStore + ?Sized>(
        &mut self,
        store: &S,
        actor: &Actor,
    ) -> Result<usize, ActionError> {
        authorize(actor, AdminCommand::ResetXp)?;
        let players = store.update_all(&mut PlayerRecord::reset_progress)?;
        self.outbox.push(SessionEvent::XpReset {
            players,
            by: actor.username.clone(),
        });
        Ok(players)
    }

    /// Puts every player back on the skill floor with no tries.
    pub fn reset_all_skills<S: PlayerStore + ?Sized>(
        &mut self,
        store: &S,
        actor: &Actor,
    ) -> Result<usize, ActionError> {
        authorize(actor, AdminCommand::ResetSkills)?;
        let skill_start = self.config.progression.skill_start;
        let players = store.update_all(&mut |record: &mut PlayerRecord| {
            record.skill = skill_start;
            record.skill_tries = 0;
        })?;
        self.outbox.push(SessionEvent::SkillsReset {
            players,
            by: actor.username.clone(),
        });
        Ok(players)
    }
}
