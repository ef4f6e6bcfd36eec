//! Things that happened inside a session, reported back to the caller.
//!
//! The core does not log or broadcast. Every mutation appends
//! [`SessionEvent`]s to the session outbox; the runtime drains them after each
//! command to log and publish.

use crate::chaos::ChaosEffect;
use crate::combat::{ActionEffect, ActionKind};
use crate::engine::TributeKind;
use crate::events::{EndReason, EventKind};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum SessionEvent {
    ActionApplied {
        actor: String,
        action: ActionKind,
        effect: ActionEffect,
        xp: u32,
        skill_ups: u32,
    },
    TributeApplied {
        actor: String,
        tribute: TributeKind,
        amount: i64,
        damage: u32,
    },
    BossDefeated {
        phase: u32,
        by: String,
    },
    MarkBroken {
        user: String,
        bonus_xp: u32,
    },
    TotemDestroyed {
        by: String,
    },
    Chaos {
        effect: ChaosEffect,
    },
    PhaseForced {
        phase: u32,
        by: String,
    },
    DamageForced {
        target: String,
        amount: u32,
        by: String,
    },
    BossReset {
        by: String,
    },
    HpSet {
        hp: u32,
        by: String,
    },
    PauseChanged {
        paused: bool,
        by: String,
    },
    HitsCleared {
        by: String,
    },
    SkillAdjusted {
        username: String,
        skill: u32,
        by: String,
    },
    XpAdded {
        username: String,
        xp: u32,
        by: String,
    },
    XpReset {
        players: usize,
        by: String,
    },
    SkillsReset {
        players: usize,
        by: String,
    },
    EventScheduled {
        at_ms: u64,
        in_ms: u64,
    },
    EventStarted {
        kind: EventKind,
        duration_ms: u64,
    },
    EventEnded {
        kind: EventKind,
        reason: EndReason,
    },
    StreamChanged {
        live: bool,
    },
    /// Mark target fallback could not read the store; the mark went to nobody.
    MarkFallbackFailed {
        error: String,
    },
}

impl SessionEvent {
    /// Short viewer-facing line, if this event deserves one.
    pub fn toast(&self) -> Option<String> {
        let text = match self {
            Self::ActionApplied {
                actor,
                action,
                effect,
                ..
            } => format!("{actor} !{action} -> {effect}"),
            Self::TributeApplied {
                actor,
                tribute,
                amount,
                damage,
            } => match tribute {
                TributeKind::Donation => format!("{actor} donated {amount} -> HIT -{damage}"),
                TributeKind::Subscription => format!("{actor} SUB -> CRIT -{damage}"),
                TributeKind::Follow => format!("{actor} FOLLOW -> -{damage}"),
            },
            Self::BossDefeated { phase, by } => format!("BOSS DEFEATED - phase {phase} cleared by {by}"),
            Self::MarkBroken { user, bonus_xp } => format!("{user} broke the mark (+{bonus_xp} XP)"),
            Self::TotemDestroyed { by } => format!("Totem destroyed by {by}"),
            Self::Chaos { effect } => effect.kind.text().to_owned(),
            Self::PhaseForced { phase, by } => format!("PHASE {phase} forced by {by}"),
            Self::DamageForced { target, amount, by } => {
                format!("{target} -> -{amount} (forced by {by})")
            }
            Self::BossReset { by } => format!("BOSS RESET by {by}"),
            Self::HpSet { hp, by } => format!("HP set to {hp} by {by}"),
            Self::PauseChanged { paused: true, by } => format!("PAUSED by {by}"),
            Self::PauseChanged { paused: false, by } => format!("RESUMED by {by}"),
            Self::HitsCleared { by } => format!("Hits cleared by {by}"),
            Self::XpAdded { username, xp, by } => format!("{username} +{xp} XP by {by}"),
            Self::XpReset { by, .. } => format!("XP reset by {by}"),
            Self::SkillsReset { players, by } => format!("Skills reset ({players}) by {by}"),
            Self::EventStarted { kind, .. } => format!("{} started", kind.title()),
            Self::EventEnded {
                kind,
                reason: EndReason::Timeout,
            } => format!("{} ended", kind.title()),
            Self::EventEnded {
                reason: EndReason::PhaseBelow2,
                ..
            } => "Events disabled below phase 2".to_owned(),
            Self::StreamChanged { live: true } => "Stream LIVE - events resumed".to_owned(),
            Self::StreamChanged { live: false } => "Stream OFFLINE - events paused".to_owned(),
            Self::SkillAdjusted { .. }
            | Self::EventScheduled { .. }
            | Self::EventEnded { .. }
            | Self::MarkFallbackFailed { .. } => return None,
        };
        Some(text)
    }

    /// Whether a fresh state snapshot should be pushed to viewers.
    pub fn broadcasts(&self) -> bool {
        match self {
            Self::EventScheduled { .. } | Self::MarkFallbackFailed { .. } => false,
            Self::EventEnded { reason, .. } => reason.is_announced(),
            _ => true,
        }
    }
}
