use std::str::FromStr;

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use super::CooldownSlot;
use crate::error::ActionError;

/// Chat command a player can resolve against the boss.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ActionKind {
    Attack,
    Heal,
    /// Charged attack.
    #[strum(to_string = "ue", serialize = "charged")]
    Ue,
    /// Strike the totem during a totem event.
    Totem,
}

impl ActionKind {
    /// Parses a chat command such as `"!attack"` or `"UE"`.
    pub fn parse(raw: &str) -> Result<Self, ActionError> {
        let name = raw.trim().trim_start_matches('!');
        Self::from_str(name).map_err(|_| ActionError::UnknownAction(name.to_owned()))
    }

    /// Totem strikes share the attack slot so they cannot be interleaved with attacks.
    pub const fn cooldown_slot(self) -> CooldownSlot {
        match self {
            Self::Attack | Self::Totem => CooldownSlot::Attack,
            Self::Heal => CooldownSlot::Heal,
            Self::Ue => CooldownSlot::Ue,
        }
    }

    /// Offensive actions feed mark charges and the exhaust window.
    pub const fn is_offensive(self) -> bool {
        matches!(self, Self::Attack | Self::Ue)
    }

    /// Source label written into the boss hit ring.
    pub const fn hit_source(self) -> &'static str {
        match self {
            Self::Attack => "chat_attack",
            Self::Heal => "chat_heal",
            Self::Ue => "chat_ue",
            Self::Totem => "chat_totem",
        }
    }
}
