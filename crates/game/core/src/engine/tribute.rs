//! Platform tributes: donations, subscriptions and follows.
//!
//! Tributes bypass cooldowns and event multipliers. Donations scale with the
//! boss phase and may roll a chaos effect.

use strum::{Display, EnumString, IntoStaticStr};

use super::{GameSession, phase_winners};
use crate::chaos::{self, ChaosEffect};
use crate::config::GameConfig;
use crate::env::{PlayerStore, RngSource};
use crate::error::ActionError;
use crate::notice::SessionEvent;
use crate::progression::award_xp;
use crate::state::{PlayerRecord, normalize_username_or};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TributeKind {
    Donation,
    Subscription,
    Follow,
}

impl TributeKind {
    /// Name used when the platform did not send one.
    pub const fn fallback_name(self) -> &'static str {
        match self {
            Self::Donation => "donator",
            Self::Subscription => "sub",
            Self::Follow => "follow",
        }
    }

    pub const fn hit_source(self) -> &'static str {
        match self {
            Self::Donation => "tribute_donation",
            Self::Subscription => "tribute_sub",
            Self::Follow => "tribute_follow",
        }
    }
}

/// One tribute as delivered by a platform integration.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tribute {
    pub kind: TributeKind,
    pub from: String,
    /// Donated amount in whole currency units. Ignored for subs and follows.
    pub amount: i64,
}

impl Tribute {
    pub fn donation(from: &str, amount: i64) -> Self {
        Self {
            kind: TributeKind::Donation,
            from: from.to_owned(),
            amount,
        }
    }

    pub fn subscription(from: &str) -> Self {
        Self {
            kind: TributeKind::Subscription,
            from: from.to_owned(),
            amount: 0,
        }
    }

    pub fn follow(from: &str) -> Self {
        Self {
            kind: TributeKind::Follow,
            from: from.to_owned(),
            amount: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TributeReport {
    pub actor: String,
    pub kind: TributeKind,
    pub damage: u32,
    pub xp_gained: u32,
    pub defeated_phase: Option<u32>,
    pub chaos: Option<ChaosEffect>,
    pub player: PlayerRecord,
}

/// Donations hit harder in later phases.
pub fn donation_phase_multiplier(phase: u32) -> f64 {
    match phase {
        0 | 1 => 1.0,
        2 => 1.2,
        3 => 1.5,
        _ => 2.0,
    }
}

impl<R: RngSource + Clone> GameSession<R> {
    /// Applies a tribute. Rejected while paused; donations must be positive.
    pub fn apply_tribute<S: PlayerStore + ?Sized>(
        &mut self,
        store: &S,
        tribute: &Tribute,
        now_ms: u64,
    ) -> Result<TributeReport, ActionError> {
        if self.boss.is_paused() {
            return Err(ActionError::Paused);
        }

        let config = &self.config.tribute;
        let (damage, xp_gained) = match tribute.kind {
            TributeKind::Donation => {
                if tribute.amount <= 0 {
                    return Err(ActionError::InvalidAmount(tribute.amount));
                }
                let raw = tribute.amount as f64
                    * config.donate_damage_mult
                    * donation_phase_multiplier(self.boss.phase());
                let damage = raw.floor().min(f64::from(GameConfig::MAX_HIT_AMOUNT)) as u32;
                if damage == 0 {
                    return Err(ActionError::InvalidAmount(tribute.amount));
                }
                let xp = config
                    .donation_base_xp
                    .saturating_add((damage / 10).min(config.donation_xp_cap));
                (damage, xp)
            }
            TributeKind::Subscription => (config.sub_damage, config.sub_xp),
            TributeKind::Follow => (config.follow_damage, config.follow_xp),
        };

        let username = normalize_username_or(&tribute.from, tribute.kind.fallback_name());
        let mut record = store
            .get(&username)?
            .unwrap_or_else(|| PlayerRecord::new(username.clone(), &self.config.progression));

        let mut next = self.clone();
        let chaos = match tribute.kind {
            TributeKind::Donation => chaos::roll(
                &next.config.tribute,
                tribute.amount,
                next.events.rng_mut(),
                now_ms,
            ),
            _ => None,
        };

        let xp = award_xp(record.xp, i64::from(xp_gained));
        record.xp = xp.xp;
        record.level = xp.level;

        let hit = next
            .boss
            .apply_damage(&username, damage, tribute.kind.hit_source(), now_ms);
        record.record_damage(hit.amount, now_ms);
        next.events.touch_activity(&username, now_ms);
        next.outbox.push(SessionEvent::TributeApplied {
            actor: username.clone(),
            tribute: tribute.kind,
            amount: tribute.amount,
            damage: hit.amount,
        });
        if let Some(effect) = chaos {
            next.chaos_last = Some(effect);
            next.outbox.push(SessionEvent::Chaos { effect });
        }
        if let Some(phase) = hit.defeated_phase {
            let winners = phase_winners(store, Some(&record))?;
            next.finish_defeat(phase, &username, winners);
        }

        store.upsert(&record)?;
        *self = next;
        Ok(TributeReport {
            actor: username,
            kind: tribute.kind,
            damage: hit.amount,
            xp_gained,
            defeated_phase: hit.defeated_phase,
            chaos,
            player: record,
        })
    }
}
