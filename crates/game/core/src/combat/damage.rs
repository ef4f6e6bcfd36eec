//! Damage and XP scaling by active event modifiers.

use arrayvec::ArrayVec;
use strum::{Display, EnumCount, IntoStaticStr};

use crate::config::{CombatConfig, GameConfig};

// ============================================================================
// Modifiers
// ============================================================================

/// Event effect that contributed a factor to a [`Multiplier`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumCount, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Modifier {
    Shield,
    /// Mark was broken, boss is vulnerable.
    Vulnerable,
    /// A standing totem absorbs part of the damage.
    Totem,
    /// The actor attacked within the exhaust window.
    Exhausted,
}

/// Product of every modifier that applies to one hit.
///
/// Factors compose by plain multiplication; no modifier overrides another.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Multiplier {
    value: f64,
    applied: ArrayVec<(Modifier, f64), { Modifier::COUNT }>,
}

impl Multiplier {
    pub fn identity() -> Self {
        Self {
            value: 1.0,
            applied: ArrayVec::new(),
        }
    }

    /// Folds `factor` into the product. Each modifier applies at most once per
    /// hit; a repeat is ignored so the breakdown always matches the product.
    pub fn apply(&mut self, modifier: Modifier, factor: f64) {
        debug_assert!(
            self.applied.iter().all(|(seen, _)| *seen != modifier),
            "{modifier} applied twice"
        );
        if self.applied.iter().any(|(seen, _)| *seen == modifier) {
            return;
        }
        if self.applied.try_push((modifier, factor)).is_ok() {
            self.value *= factor;
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn applied(&self) -> &[(Modifier, f64)] {
        &self.applied
    }

    pub fn is_identity(&self) -> bool {
        self.applied.is_empty()
    }

    /// `floor(base × value)`, clamped into `[0, MAX_HIT_AMOUNT]`.
    pub fn scale(&self, base: u32) -> u32 {
        let scaled = (f64::from(base) * self.value).floor();
        if !scaled.is_finite() || scaled <= 0.0 {
            return 0;
        }
        scaled.min(f64::from(GameConfig::MAX_HIT_AMOUNT)) as u32
    }
}

impl Default for Multiplier {
    fn default() -> Self {
        Self::identity()
    }
}

// ============================================================================
// Base values
// ============================================================================

/// Attack base before event scaling: configured damage plus skill plus the
/// subscriber bonus, clamped to `[1, 9999]`.
pub fn attack_base(config: &CombatConfig, skill: u32, subscriber: bool) -> u32 {
    let bonus = if subscriber {
        config.subscriber_attack_bonus
    } else {
        0
    };
    config
        .attack_damage
        .saturating_add(skill)
        .saturating_add(bonus)
        .clamp(1, 9999)
}

/// Charged attack base: the attack base times the charged multiplier.
pub fn charged_base(config: &CombatConfig, skill: u32, subscriber: bool) -> u32 {
    attack_base(config, skill, subscriber).saturating_mul(config.charged_multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factors_multiply() {
        let mut mult = Multiplier::identity();
        mult.apply(Modifier::Shield, 0.2);
        mult.apply(Modifier::Exhausted, 0.5);
        assert!((mult.value() - 0.1).abs() < 1e-12);
        assert_eq!(mult.applied().len(), 2);
        assert_eq!(mult.scale(100), 10);
    }

    #[test]
    fn breakdown_holds_every_modifier() {
        let mut mult = Multiplier::identity();
        mult.apply(Modifier::Shield, 0.2);
        mult.apply(Modifier::Vulnerable, 1.5);
        mult.apply(Modifier::Totem, 0.5);
        mult.apply(Modifier::Exhausted, 0.5);
        assert_eq!(mult.applied().len(), Modifier::COUNT);
        let product: f64 = mult.applied().iter().map(|(_, factor)| factor).product();
        assert!((mult.value() - product).abs() < 1e-12);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "shield applied twice")]
    fn repeated_modifier_is_a_bug() {
        let mut mult = Multiplier::identity();
        mult.apply(Modifier::Shield, 0.2);
        mult.apply(Modifier::Shield, 0.2);
    }

    #[test]
    fn scale_floors() {
        let mut mult = Multiplier::identity();
        mult.apply(Modifier::Vulnerable, 1.5);
        assert_eq!(mult.scale(7), 10);
        mult.apply(Modifier::Shield, 0.0);
        assert_eq!(mult.scale(7), 0);
    }

    #[test]
    fn attack_base_adds_skill_and_sub_bonus() {
        let config = CombatConfig::default();
        assert_eq!(attack_base(&config, 1, false), 6);
        assert_eq!(attack_base(&config, 1, true), 8);
        assert_eq!(attack_base(&config, 20_000, false), 9999);
        assert_eq!(charged_base(&config, 1, false), 18);
    }
}
