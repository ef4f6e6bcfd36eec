use crate::config::CombatConfig;

/// Independent cooldown timestamp on a player record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CooldownSlot {
    Attack,
    Heal,
    Ue,
}

impl CooldownSlot {
    pub const fn duration_ms(self, config: &CombatConfig) -> u64 {
        match self {
            Self::Attack => config.attack_cooldown_ms,
            Self::Heal => config.heal_cooldown_ms,
            Self::Ue => config.charged_cooldown_ms,
        }
    }
}

/// Time left before a slot last used at `last_ms` is ready again.
///
/// `last_ms == 0` means the slot was never used.
pub fn remaining_ms(last_ms: u64, cooldown_ms: u64, now_ms: u64) -> Option<u64> {
    if last_ms == 0 {
        return None;
    }
    let elapsed = now_ms.saturating_sub(last_ms);
    (elapsed < cooldown_ms).then(|| cooldown_ms - elapsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_used_slot_is_ready() {
        assert_eq!(remaining_ms(0, 10_000, 5), None);
    }

    #[test]
    fn blocks_until_cooldown_elapses() {
        assert_eq!(remaining_ms(1_000, 10_000, 4_000), Some(7_000));
        assert_eq!(remaining_ms(1_000, 10_000, 11_000), None);
    }

    #[test]
    fn clock_going_backwards_blocks_for_full_cooldown() {
        assert_eq!(remaining_ms(5_000, 10_000, 1_000), Some(10_000));
    }
}
