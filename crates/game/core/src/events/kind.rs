use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Global modifier that can be active during phase 2 and later.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EventKind {
    /// Boss takes reduced damage.
    Shield,
    /// Charged attacks are disabled.
    Silence,
    /// One player must land offensive hits to make the boss vulnerable.
    Mark,
    /// Players who attacked recently deal less damage and earn less XP.
    Exhaust,
    /// Attack heals the boss and heal damages it.
    Roleswap,
    /// A side objective with its own HP that shields the boss until destroyed.
    Totem,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::Shield,
        EventKind::Silence,
        EventKind::Mark,
        EventKind::Exhaust,
        EventKind::Roleswap,
        EventKind::Totem,
    ];

    pub const fn title(self) -> &'static str {
        match self {
            Self::Shield => "Break the Shield",
            Self::Silence => "Silence - UE disabled",
            Self::Mark => "Mark",
            Self::Exhaust => "Exhaust - rotate attackers",
            Self::Roleswap => "Role Swap - heal deals dmg / attack heals boss",
            Self::Totem => "Hunt the Totem",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Shield => "Boss shield active",
            Self::Silence => "UE disabled",
            Self::Mark => "Protect mark objective",
            Self::Exhaust => "Recent attackers deal less damage",
            Self::Roleswap => "Heal damages boss, attack heals boss",
            Self::Totem => "Destroy the totem",
        }
    }

    /// Shield and roleswap always run for the fixed duration instead of a random one.
    pub const fn has_fixed_duration(self) -> bool {
        matches!(self, Self::Shield | Self::Roleswap)
    }
}

/// Why an active event stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EndReason {
    Timeout,
    #[strum(serialize = "phase_below_2")]
    #[cfg_attr(feature = "serde", serde(rename = "phase_below_2"))]
    PhaseBelow2,
    /// The stream came back after the remaining time had already run out.
    ResumeExpired,
    TotemDestroyed,
}

impl EndReason {
    /// Whether viewers get a dedicated "event ended" notice.
    ///
    /// Totem destruction is announced by the strike that caused it, and an event
    /// that expired while offline ends silently.
    pub const fn is_announced(self) -> bool {
        matches!(self, Self::Timeout | Self::PhaseBelow2)
    }
}

/// Progress of a mark event.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarkState {
    pub marked_user: String,
    pub charges: u32,
    pub charge_target: u32,
    pub broken: bool,
    pub bonus_granted: bool,
}

/// HP pool of a totem event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TotemState {
    pub hp: u32,
    pub hp_max: u32,
    pub destroyed: bool,
}

impl TotemState {
    pub fn is_standing(&self) -> bool {
        self.hp > 0
    }
}

/// Per-kind payload of an active event.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventMeta {
    Plain,
    Mark(MarkState),
    Totem(TotemState),
}
