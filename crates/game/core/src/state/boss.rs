use arrayvec::ArrayVec;

use crate::config::{BossConfig, GameConfig};

/// Actor name used for hit entries the game writes itself.
pub const SYSTEM_ACTOR: &str = "SYSTEM";

/// One entry of the recent-hit ring.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitEntry {
    pub actor: String,
    pub amount: u32,
    pub source: String,
    pub at_ms: u64,
}

/// Player snapshot taken when a phase is cleared.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhaseWinner {
    pub username: String,
    pub xp: u64,
    pub level: u32,
    pub skill: u32,
}

/// What [`BossState::apply_damage`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageReport {
    /// Amount after clamping to [`GameConfig::MAX_HIT_AMOUNT`].
    pub amount: u32,
    /// Phase that was cleared by this hit, if any.
    pub defeated_phase: Option<u32>,
}

impl DamageReport {
    pub fn defeated(&self) -> bool {
        self.defeated_phase.is_some()
    }
}

type HitRing = ArrayVec<HitEntry, { GameConfig::HIT_HISTORY }>;

/// Boss health, phase and hit history.
///
/// Invariants: `phase >= 1`, `0 <= hp <= max_hp`, and
/// `max_hp = base_hp + (phase - 1) * phase_hp_step`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BossState {
    base_hp: u32,
    phase_hp_step: u32,
    max_hp: u32,
    hp: u32,
    phase: u32,
    /// Newest first.
    last_hits: HitRing,
    phase_winners: Vec<PhaseWinner>,
    defeated_phase: Option<u32>,
    paused: bool,
    phase_start_ms: u64,
}

impl BossState {
    pub fn new(config: &BossConfig, now_ms: u64) -> Self {
        let mut boss = Self {
            base_hp: config.base_hp.max(1),
            phase_hp_step: config.phase_hp_step,
            max_hp: 0,
            hp: 0,
            phase: 1,
            last_hits: ArrayVec::new(),
            phase_winners: Vec::new(),
            defeated_phase: None,
            paused: false,
            phase_start_ms: now_ms,
        };
        boss.set_phase(1);
        boss
    }

    pub fn hp(&self) -> u32 {
        self.hp
    }

    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    pub fn base_hp(&self) -> u32 {
        self.base_hp
    }

    pub fn phase(&self) -> u32 {
        self.phase
    }

    pub fn last_hits(&self) -> &[HitEntry] {
        &self.last_hits
    }

    /// Top players by total XP at the moment the last phase was cleared.
    ///
    /// This is the all-time XP leaderboard taken at defeat time, not the
    /// players who contributed most during that phase.
    pub fn phase_winners(&self) -> &[PhaseWinner] {
        &self.phase_winners
    }

    pub fn defeated_phase(&self) -> Option<u32> {
        self.defeated_phase
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn phase_start_ms(&self) -> u64 {
        self.phase_start_ms
    }

    /// Max HP for `phase` under this boss's scaling.
    pub fn max_hp_for(&self, phase: u32) -> u32 {
        let extra = phase.saturating_sub(1).saturating_mul(self.phase_hp_step);
        self.base_hp.saturating_add(extra)
    }

    /// Moves to `phase` (at least 1) with full HP.
    pub fn set_phase(&mut self, phase: u32) {
        self.phase = phase.max(1);
        self.max_hp = self.max_hp_for(self.phase);
        self.hp = self.max_hp;
    }

    /// Subtracts `amount` and advances the phase when HP reaches exactly zero.
    ///
    /// Winners are not computed here; the caller records them with
    /// [`BossState::record_winners`] once it has queried the leaderboard.
    pub fn apply_damage(
        &mut self,
        actor: &str,
        amount: u32,
        source: &str,
        now_ms: u64,
    ) -> DamageReport {
        let amount = amount.min(GameConfig::MAX_HIT_AMOUNT);
        self.hp = self.hp.saturating_sub(amount);
        self.push_hit(HitEntry {
            actor: actor.to_owned(),
            amount,
            source: source.to_owned(),
            at_ms: now_ms,
        });

        if self.hp > 0 {
            return DamageReport {
                amount,
                defeated_phase: None,
            };
        }

        let cleared = self.phase;
        self.set_phase(cleared.saturating_add(1));
        self.defeated_phase = Some(cleared);
        self.phase_start_ms = now_ms;
        self.push_hit(HitEntry {
            actor: SYSTEM_ACTOR.to_owned(),
            amount: 0,
            source: format!("BOSS_DEFEATED phase {cleared}"),
            at_ms: now_ms,
        });
        DamageReport {
            amount,
            defeated_phase: Some(cleared),
        }
    }

    /// Restores HP up to `max_hp`. Returns the amount actually restored.
    pub fn apply_heal(&mut self, amount: u32) -> u32 {
        let before = self.hp;
        self.hp = self
            .hp
            .saturating_add(amount.min(GameConfig::MAX_HIT_AMOUNT))
            .min(self.max_hp);
        self.hp - before
    }

    /// Forces HP into `[0, max_hp]` without a phase transition.
    pub fn set_hp(&mut self, hp: u32) {
        self.hp = hp.min(self.max_hp);
    }

    pub fn record_winners(&mut self, winners: Vec<PhaseWinner>) {
        self.phase_winners = winners;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Back to phase 1 with full HP, leaving a marker in the hit ring.
    pub fn reset(&mut self, by: &str, now_ms: u64) {
        self.set_phase(1);
        self.phase_start_ms = now_ms;
        self.push_hit(HitEntry {
            actor: SYSTEM_ACTOR.to_owned(),
            amount: 0,
            source: format!("RESET by {by}"),
            at_ms: now_ms,
        });
    }

    pub fn clear_hits(&mut self) {
        self.last_hits.clear();
    }

    pub fn restart_phase_clock(&mut self, now_ms: u64) {
        self.phase_start_ms = now_ms;
    }

    fn push_hit(&mut self, entry: HitEntry) {
        if self.last_hits.is_full() {
            self.last_hits.pop();
        }
        self.last_hits.insert(0, entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boss() -> BossState {
        BossState::new(&BossConfig::default(), 0)
    }

    #[test]
    fn defeat_advances_exactly_one_phase() {
        let mut boss = boss();
        let report = boss.apply_damage("alice", 5000, "x", 10);

        assert_eq!(report.defeated_phase, Some(1));
        assert_eq!(boss.phase(), 2);
        assert_eq!(boss.max_hp(), 7000);
        assert_eq!(boss.hp(), 7000);
        assert_eq!(boss.phase_start_ms(), 10);
        assert_eq!(boss.last_hits()[0].actor, SYSTEM_ACTOR);
        assert_eq!(boss.last_hits()[1].actor, "alice");
    }

    #[test]
    fn overkill_still_advances_one_phase() {
        let mut boss = boss();
        let report = boss.apply_damage("alice", u32::MAX, "x", 0);
        assert_eq!(report.amount, GameConfig::MAX_HIT_AMOUNT);
        assert_eq!(boss.phase(), 2);
        assert_eq!(boss.hp(), boss.max_hp());
    }

    #[test]
    fn hp_stays_in_bounds() {
        let mut boss = boss();
        for amount in [0, 1, 17, 4000, 999, 3] {
            boss.apply_damage("bob", amount, "x", 0);
            assert!(boss.hp() <= boss.max_hp());
        }
        boss.apply_heal(u32::MAX);
        assert_eq!(boss.hp(), boss.max_hp());
    }

    #[test]
    fn heal_reports_actual_amount() {
        let mut boss = boss();
        boss.apply_damage("bob", 10, "x", 0);
        assert_eq!(boss.apply_heal(15), 10);
        assert_eq!(boss.phase(), 1);
    }

    #[test]
    fn hit_ring_keeps_newest_ten() {
        let mut boss = boss();
        for i in 0..15 {
            boss.apply_damage(&format!("p{i}"), 1, "x", i);
        }
        let hits = boss.last_hits();
        assert_eq!(hits.len(), GameConfig::HIT_HISTORY);
        assert_eq!(hits[0].actor, "p14");
        assert_eq!(hits[9].actor, "p5");
    }

    #[test]
    fn set_phase_rescales_and_refills() {
        let mut boss = boss();
        boss.apply_damage("bob", 100, "x", 0);
        boss.set_phase(4);
        assert_eq!(boss.max_hp(), 11_000);
        assert_eq!(boss.hp(), 11_000);
        boss.set_phase(0);
        assert_eq!(boss.phase(), 1);
    }

    #[test]
    fn set_hp_clamps_without_transition() {
        let mut boss = boss();
        boss.set_hp(0);
        assert_eq!(boss.hp(), 0);
        assert_eq!(boss.phase(), 1);
        boss.set_hp(u32::MAX);
        assert_eq!(boss.hp(), boss.max_hp());
    }

    #[test]
    fn reset_returns_to_phase_one() {
        let mut boss = boss();
        boss.set_phase(3);
        boss.reset("admin", 5);
        assert_eq!(boss.phase(), 1);
        assert_eq!(boss.hp(), 5000);
        assert_eq!(boss.last_hits()[0].source, "RESET by admin");
    }
}
