use std::fmt;

use super::{ActionKind, Multiplier};
use crate::events::{MarkProgress, TotemHit};
use crate::state::PlayerRecord;

/// What an applied action did to the boss or the totem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionEffect {
    BossDamaged(u32),
    BossHealed(u32),
    TotemDamaged(u32),
}

impl fmt::Display for ActionEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BossDamaged(amount) => write!(f, "-{amount}"),
            Self::BossHealed(amount) => write!(f, "+{amount}"),
            Self::TotemDamaged(amount) => write!(f, "totem -{amount}"),
        }
    }
}

/// Full result of an action that passed validation and cooldown.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionReport {
    pub action: ActionKind,
    pub actor: String,
    pub effect: ActionEffect,
    /// XP added to the actor, including any mark bonus.
    pub xp_gained: u32,
    pub skill_ups: u32,
    /// Boss damage multiplier that was in force, identity for heals.
    pub multiplier: Multiplier,
    pub defeated_phase: Option<u32>,
    pub mark: Option<MarkProgress>,
    pub totem: Option<TotemHit>,
    /// Record as written back to the store.
    pub player: PlayerRecord,
}

impl ActionReport {
    pub fn damage(&self) -> Option<u32> {
        match self.effect {
            ActionEffect::BossDamaged(amount) | ActionEffect::TotemDamaged(amount) => Some(amount),
            ActionEffect::BossHealed(_) => None,
        }
    }

    pub fn heal(&self) -> Option<u32> {
        match self.effect {
            ActionEffect::BossHealed(amount) => Some(amount),
            _ => None,
        }
    }

    pub fn defeated(&self) -> bool {
        self.defeated_phase.is_some()
    }
}

/// Result of [`crate::GameSession::resolve_action`].
#[derive(Clone, Debug, PartialEq)]
pub enum ActionOutcome {
    Applied(Box<ActionReport>),
    /// The slot is still cooling down. Nothing changed and nothing should be announced.
    CooldownBlocked { remaining_ms: u64 },
}

impl ActionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn report(&self) -> Option<&ActionReport> {
        match self {
            Self::Applied(report) => Some(report),
            Self::CooldownBlocked { .. } => None,
        }
    }
}
