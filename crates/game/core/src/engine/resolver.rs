//! Chat command resolution.

use super::{GameSession, phase_winners};
use crate::auth::Actor;
use crate::combat::{
    ActionEffect, ActionKind, ActionOutcome, ActionReport, Multiplier, attack_base, charged_base,
    remaining_ms,
};
use crate::env::{PlayerStore, RngSource};
use crate::error::ActionError;
use crate::notice::SessionEvent;
use crate::progression::{award_skill, award_xp};
use crate::state::{PlayerRecord, normalize_username};

impl<R: RngSource + Clone> GameSession<R> {
    /// Parses `command` (e.g. `"!attack"`) and resolves it.
    pub fn resolve_command<S: PlayerStore + ?Sized>(
        &mut self,
        store: &S,
        actor: &Actor,
        command: &str,
        now_ms: u64,
    ) -> Result<ActionOutcome, ActionError> {
        let action = ActionKind::parse(command)?;
        self.resolve_action(store, actor, action, now_ms)
    }

    /// Resolves one chat action for `actor`.
    ///
    /// Checks run in order: pause, event preconditions, cooldown. A cooldown
    /// block returns [`ActionOutcome::CooldownBlocked`] and changes nothing.
    /// The updated player record is written before the boss change is
    /// committed; if the store fails the whole action is dropped.
    pub fn resolve_action<S: PlayerStore + ?Sized>(
        &mut self,
        store: &S,
        actor: &Actor,
        action: ActionKind,
        now_ms: u64,
    ) -> Result<ActionOutcome, ActionError> {
        if self.boss.is_paused() {
            return Err(ActionError::Paused);
        }
        match action {
            ActionKind::Ue if self.events.is_silence_active() => {
                return Err(ActionError::Silenced);
            }
            ActionKind::Totem if !self.events.is_totem_active() => {
                return Err(ActionError::TotemInactive);
            }
            _ => {}
        }

        let username = normalize_username(&actor.username);
        let mut record = store
            .get(&username)?
            .unwrap_or_else(|| PlayerRecord::new(username.clone(), &self.config.progression));

        let slot = action.cooldown_slot();
        let cooldown_ms = slot.duration_ms(&self.config.combat);
        if let Some(remaining_ms) = remaining_ms(record.last_used_ms(slot), cooldown_ms, now_ms) {
            return Ok(ActionOutcome::CooldownBlocked { remaining_ms });
        }

        let mut next = self.clone();
        let report = next.apply_action(&username, actor.subscriber, action, &mut record, now_ms)?;
        if let Some(phase) = report.defeated_phase {
            let winners = phase_winners(store, Some(&record))?;
            next.finish_defeat(phase, &username, winners);
        }

        store.upsert(&record)?;
        *self = next;
        Ok(ActionOutcome::Applied(Box::new(report)))
    }

    fn apply_action(
        &mut self,
        username: &str,
        subscriber: bool,
        action: ActionKind,
        record: &mut PlayerRecord,
        now_ms: u64,
    ) -> Result<ActionReport, ActionError> {
        let combat = self.config.combat.clone();
        let last_offensive_ms = record.last_offensive_ms;
        let roleswap = self.events.is_roleswap_active();
        let xp_mult = self
            .events
            .xp_multiplier(action, last_offensive_ms, now_ms);

        let mut multiplier = Multiplier::identity();
        let mut defeated_phase = None;
        let mut mark = None;
        let mut totem = None;
        let mut event_out = Vec::new();

        let (effect, base_xp) = match action {
            ActionKind::Attack | ActionKind::Ue => {
                let (base, xp) = if action == ActionKind::Attack {
                    (attack_base(&combat, record.skill, subscriber), combat.attack_xp)
                } else {
                    (charged_base(&combat, record.skill, subscriber), combat.charged_xp)
                };
                if roleswap {
                    (ActionEffect::BossHealed(self.boss.apply_heal(base)), xp)
                } else {
                    multiplier = self
                        .events
                        .boss_damage_multiplier(action, last_offensive_ms, now_ms);
                    let hit = self.boss.apply_damage(
                        username,
                        multiplier.scale(base),
                        action.hit_source(),
                        now_ms,
                    );
                    defeated_phase = hit.defeated_phase;
                    mark = self.events.on_boss_hit(username, action);
                    (ActionEffect::BossDamaged(hit.amount), xp)
                }
            }
            ActionKind::Heal => {
                if roleswap {
                    multiplier = self
                        .events
                        .boss_damage_multiplier(action, last_offensive_ms, now_ms);
                    let hit = self.boss.apply_damage(
                        username,
                        multiplier.scale(combat.heal_amount),
                        "chat_heal_swap",
                        now_ms,
                    );
                    defeated_phase = hit.defeated_phase;
                    (ActionEffect::BossDamaged(hit.amount), combat.heal_xp)
                } else {
                    let healed = self.boss.apply_heal(combat.heal_amount);
                    (ActionEffect::BossHealed(healed), combat.heal_xp)
                }
            }
            ActionKind::Totem => {
                let base = attack_base(&combat, record.skill, subscriber);
                let hit =
                    self.events
                        .damage_totem(base, now_ms, self.boss.phase(), &mut event_out)?;
                totem = Some(hit);
                let xp = combat
                    .totem_xp
                    .saturating_add(self.config.events.totem_xp_extra);
                (ActionEffect::TotemDamaged(hit.dealt), xp)
            }
        };

        let bonus_xp = mark.as_ref().map_or(0, |progress| progress.bonus_xp);
        let xp_gained = xp_mult.scale(base_xp).saturating_add(bonus_xp);
        let xp = award_xp(record.xp, i64::from(xp_gained));
        record.xp = xp.xp;
        record.level = xp.level;

        let add_tries = match action {
            ActionKind::Heal => 0,
            _ => self.config.progression.skill_tries_per_attack,
        };
        let skill = award_skill(
            record.skill,
            record.skill_tries,
            add_tries,
            &self.config.progression,
        );
        record.skill = skill.skill;
        record.skill_tries = skill.skill_tries;

        if let ActionEffect::BossDamaged(amount) = effect {
            record.record_damage(amount, now_ms);
        }
        record.mark_used(action.cooldown_slot(), now_ms);
        if action.is_offensive() {
            record.last_offensive_ms = now_ms;
        }
        self.events.touch_activity(username, now_ms);

        self.outbox.push(SessionEvent::ActionApplied {
            actor: username.to_owned(),
            action,
            effect,
            xp: xp_gained,
            skill_ups: skill.skill_ups,
        });
        if let Some(progress) = mark.as_ref().filter(|progress| progress.broken_now) {
            self.outbox.push(SessionEvent::MarkBroken {
                user: progress.marked_user.clone(),
                bonus_xp: progress.bonus_xp,
            });
        }
        if totem.is_some_and(|hit| hit.destroyed) {
            self.outbox.push(SessionEvent::TotemDestroyed {
                by: username.to_owned(),
            });
        }
        self.outbox.extend(event_out);

        Ok(ActionReport {
            action,
            actor: username.to_owned(),
            effect,
            xp_gained,
            skill_ups: skill.skill_ups,
            multiplier,
            defeated_phase,
            mark,
            totem,
            player: record.clone(),
        })
    }
}
