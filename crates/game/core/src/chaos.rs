//! Cosmetic chaos effects rolled by large donations.

use strum::{Display, EnumIter, IntoStaticStr};

use crate::config::TributeConfig;
use crate::env::RngSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ChaosKind {
    ScreenShake,
    ZoomPunch,
    InvertHint,
    CritRain,
    Slowmo,
}

impl ChaosKind {
    pub const ALL: [ChaosKind; 5] = [
        ChaosKind::ScreenShake,
        ChaosKind::ZoomPunch,
        ChaosKind::InvertHint,
        ChaosKind::CritRain,
        ChaosKind::Slowmo,
    ];

    pub const fn text(self) -> &'static str {
        match self {
            Self::ScreenShake => "CHAOS: Screen shake!",
            Self::ZoomPunch => "CHAOS: Zoom punch!",
            Self::InvertHint => "CHAOS: Invert controls (hint)!",
            Self::CritRain => "CHAOS: Critical rain!",
            Self::Slowmo => "CHAOS: Slow motion vibe!",
        }
    }
}

/// Last chaos effect shown to viewers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChaosEffect {
    pub kind: ChaosKind,
    pub at_ms: u64,
}

/// Rolls an effect when chaos is enabled and `amount` reaches the threshold.
pub fn roll(
    config: &TributeConfig,
    amount: i64,
    rng: &mut impl RngSource,
    now_ms: u64,
) -> Option<ChaosEffect> {
    if !config.chaos_enabled || amount < i64::from(config.chaos_threshold) {
        return None;
    }
    let index = rng.pick_index(ChaosKind::ALL.len())?;
    Some(ChaosEffect {
        kind: ChaosKind::ALL[index],
        at_ms: now_ms,
    })
}
