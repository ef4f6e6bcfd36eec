//! End-to-end behaviour of a `GameSession` driven only through its public API.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use boss_core::{
    ActionError, ActionKind, ActionOutcome, Actor, EndReason, EventKind, GameConfig, GameSession,
    PcgRng, PlayerRecord, PlayerStore, ProgressionConfig, SequenceRng, SessionEvent, StoreError,
    Timer, Tribute, award_skill, required_skill_tries,
};
use boss_core::state::rank_hitters;

#[derive(Default)]
struct TestStore {
    rows: RefCell<BTreeMap<String, PlayerRecord>>,
    fail_get: Cell<bool>,
    fail_upsert: Cell<bool>,
}

impl TestStore {
    fn xp(&self, username: &str) -> Option<u64> {
        self.rows.borrow().get(username).map(|row| row.xp)
    }
}

impl PlayerStore for TestStore {
    fn get(&self, username: &str) -> Result<Option<PlayerRecord>, StoreError> {
        if self.fail_get.get() {
            return Err(StoreError::Unavailable("read refused".into()));
        }
        Ok(self.rows.borrow().get(username).cloned())
    }

    fn upsert(&self, record: &PlayerRecord) -> Result<(), StoreError> {
        if self.fail_upsert.get() {
            return Err(StoreError::Unavailable("write refused".into()));
        }
        self.rows
            .borrow_mut()
            .insert(record.username.clone(), record.clone());
        Ok(())
    }

    fn top_by_xp(&self, limit: usize) -> Result<Vec<PlayerRecord>, StoreError> {
        let mut rows: Vec<_> = self.rows.borrow().values().cloned().collect();
        rows.sort_by(|a, b| b.xp.cmp(&a.xp));
        rows.truncate(limit);
        Ok(rows)
    }

    fn known_usernames(&self, limit: usize) -> Result<Vec<String>, StoreError> {
        Ok(self.rows.borrow().keys().take(limit).cloned().collect())
    }

    fn top_hitters_since(
        &self,
        day_start_ms: u64,
        limit: usize,
    ) -> Result<Vec<PlayerRecord>, StoreError> {
        Ok(rank_hitters(self.rows.borrow().values(), day_start_ms, limit))
    }

    fn update_all(&self, update: &mut dyn FnMut(&mut PlayerRecord)) -> Result<usize, StoreError> {
        if self.fail_upsert.get() {
            return Err(StoreError::Unavailable("write refused".into()));
        }
        let mut rows = self.rows.borrow_mut();
        rows.values_mut().for_each(|row| update(row));
        Ok(rows.len())
    }
}

fn session() -> GameSession<SequenceRng> {
    GameSession::new(GameConfig::default(), SequenceRng::new([0]), 0)
}

fn admin() -> Actor {
    Actor::admin("root")
}

#[test]
fn boss_hp_stays_within_bounds() {
    let store = TestStore::default();
    let mut session = GameSession::new(GameConfig::default(), PcgRng::seeded(7), 0);
    let mut rng = PcgRng::seeded(99);

    for step in 0..500u64 {
        let amount = i64::from(boss_core::RngSource::next_u32(&mut rng) % 4_000);
        session
            .apply_damage(&store, &admin(), "tester", amount, "fuzz", step)
            .expect("admin damage");
        let boss = session.boss();
        assert!(boss.hp() <= boss.max_hp());
        assert_eq!(
            boss.max_hp(),
            5_000 + (boss.phase() - 1) * 2_000,
            "max hp follows the phase"
        );
    }
}

#[test]
fn defeat_moves_to_next_phase_with_full_hp() {
    let store = TestStore::default();
    let mut session = session();

    let hit = session
        .apply_damage(&store, &admin(), "user", 5_000, "x", 1_000)
        .expect("damage");

    assert!(hit.defeated());
    assert_eq!(hit.defeated_phase, Some(1));
    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, 2);
    assert_eq!(snapshot.boss_max_hp, 7_000);
    assert_eq!(snapshot.boss_hp, 7_000);
    assert_eq!(snapshot.defeated_phase, Some(1));
    assert_eq!(snapshot.phase_start_ms, 1_000);
}

#[test]
fn skill_curve_matches_reference_values() {
    let cfg = ProgressionConfig::default();
    assert_eq!(required_skill_tries(1, &cfg), 40);

    let award = award_skill(1, 0, 40, &cfg);
    assert_eq!(
        (award.skill, award.skill_tries, award.skill_ups),
        (2, 0, 1)
    );

    for skill in 1..200 {
        assert!(required_skill_tries(skill + 1, &cfg) > required_skill_tries(skill, &cfg));
    }
}

#[test]
fn skill_grant_spanning_thresholds_counts_each_level() {
    let cfg = ProgressionConfig::default();
    for k in 1..20u32 {
        let tries: u32 = (1..=k).map(|skill| required_skill_tries(skill, &cfg)).sum();
        let award = award_skill(1, 0, tries, &cfg);
        assert_eq!(award.skill_ups, k);
        assert_eq!(award.skill, 1 + k);
        assert_eq!(award.skill_tries, 0);

        let short = award_skill(1, 0, tries - 1, &cfg);
        assert_eq!(short.skill_ups, k - 1);
    }
}

#[test]
fn cooldown_block_changes_nothing() {
    let store = TestStore::default();
    let mut session = session();
    let alice = Actor::viewer("alice");

    let first = session
        .resolve_action(&store, &alice, ActionKind::Attack, 100_000)
        .expect("attack");
    assert!(first.is_applied());
    session.drain_events();

    let hp = session.boss().hp();
    let record = store.rows.borrow().get("alice").cloned();

    let blocked = session
        .resolve_action(&store, &alice, ActionKind::Attack, 105_000)
        .expect("blocked");
    assert_eq!(
        blocked,
        ActionOutcome::CooldownBlocked {
            remaining_ms: 5_000
        }
    );
    assert_eq!(session.boss().hp(), hp);
    assert_eq!(store.rows.borrow().get("alice").cloned(), record);
    assert!(session.drain_events().is_empty());
}

#[test]
fn failed_store_read_leaves_boss_untouched() {
    let store = TestStore::default();
    store.fail_get.set(true);
    let mut session = session();
    let before = session.snapshot();

    let err = session
        .resolve_action(&store, &Actor::viewer("alice"), ActionKind::Attack, 50_000)
        .expect_err("store down");

    assert!(matches!(err, ActionError::Store(_)));
    assert_eq!(err.reason_code(), "store_unavailable");
    assert_eq!(session.snapshot(), before);
}

#[test]
fn failed_store_write_rolls_back_the_killing_blow() {
    let store = TestStore::default();
    store.fail_upsert.set(true);
    let mut session = session();
    session.set_hp(&admin(), 3).expect("set hp");
    session.drain_events();
    let before = session.snapshot();

    let err = session
        .resolve_action(&store, &Actor::viewer("alice"), ActionKind::Attack, 50_000)
        .expect_err("store down");

    assert!(matches!(err, ActionError::Store(_)));
    assert_eq!(session.snapshot(), before);
    assert_eq!(session.boss().phase(), 1);
    assert!(session.drain_events().is_empty());
    assert_eq!(store.xp("alice"), None);

    store.fail_upsert.set(false);
    let outcome = session
        .resolve_action(&store, &Actor::viewer("alice"), ActionKind::Attack, 50_000)
        .expect("retry");
    assert!(outcome.report().is_some_and(|report| report.defeated()));
    assert_eq!(session.boss().phase(), 2);
}

#[test]
fn failed_tribute_write_keeps_rng_and_boss() {
    let store = TestStore::default();
    store.fail_upsert.set(true);
    let mut session = session();
    let before = session.snapshot();

    assert!(
        session
            .apply_tribute(&store, &Tribute::donation("dana", 50), 10)
            .is_err()
    );
    assert_eq!(session.snapshot(), before);
    assert_eq!(session.chaos_last(), None);
}

#[test]
fn pause_and_resume_preserve_remaining_time() {
    let store = TestStore::default();
    let mut session = session();
    session.set_phase(&admin(), 2, 0).expect("phase");
    assert!(session.start_event(&store, EventKind::Shield, 0));

    // 100s of live time elapse, then the stream goes dark for 50s.
    assert!(session.set_stream_live(false, 100_000));
    let frozen = session.snapshot().active_event.expect("still active").timer;
    assert_eq!(
        frozen,
        Timer::Paused {
            remaining_ms: 200_000
        }
    );

    for second in 100..150 {
        session.tick(&store, second * 1_000);
    }
    assert!(session.set_stream_live(true, 150_000));
    let resumed = session.snapshot().active_event.expect("resumed").timer;
    assert_eq!(resumed.remaining_ms(150_000), 200_000);
    assert_eq!(resumed.ends_at_ms(), Some(350_000));
}

#[test]
fn event_already_expired_when_paused_ends_on_resume() {
    let store = TestStore::default();
    let mut session = session();
    session.set_phase(&admin(), 2, 0).expect("phase");
    assert!(session.start_event(&store, EventKind::Shield, 0));
    session.drain_events();

    // No tick between expiry and going offline.
    session.set_stream_live(false, 400_000);
    session.set_stream_live(true, 500_000);

    let events = session.drain_events();
    assert!(events.contains(&SessionEvent::EventEnded {
        kind: EventKind::Shield,
        reason: EndReason::ResumeExpired,
    }));
    assert!(session.snapshot().active_event.is_none());
    assert!(session.snapshot().next_event.is_some());
}

#[test]
fn no_active_event_below_phase_two_or_offline() {
    let store = TestStore::default();
    let mut session = GameSession::new(GameConfig::default(), PcgRng::seeded(3), 0);

    for second in 0..2_000u64 {
        session.tick(&store, second * 1_000);
        assert!(session.snapshot().active_event.is_none());
    }

    session.set_phase(&admin(), 3, 2_000_000).expect("phase");
    session.set_stream_live(false, 2_000_000);
    for second in 2_000..4_000u64 {
        session.tick(&store, second * 1_000);
        assert!(session.snapshot().active_event.is_none());
    }

    session.set_stream_live(true, 4_000_000);
    let mut saw_event = false;
    for second in 4_000..5_000u64 {
        session.tick(&store, second * 1_000);
        saw_event |= session.snapshot().active_event.is_some();
    }
    assert!(saw_event);
}

#[test]
fn mark_breaks_once_with_single_bonus() {
    let store = TestStore::default();
    let mut session = session();
    session.set_phase(&admin(), 2, 0).expect("phase");
    session.touch_activity("marky", 0);
    assert!(session.start_event(&store, EventKind::Mark, 0));

    let marky = Actor::viewer("marky");
    let mut bonuses = Vec::new();
    for hit in 0..4u64 {
        // Attack cooldown is 10s.
        let outcome = session
            .resolve_action(&store, &marky, ActionKind::Attack, 20_000 + hit * 10_000)
            .expect("attack");
        let report = outcome.report().expect("applied");
        let mark = report.mark.clone().expect("marked user");
        bonuses.push(mark.bonus_xp);
        if hit >= 2 {
            assert!(mark.broken);
            assert_eq!(mark.charges, 3);
        }
    }
    assert_eq!(bonuses, vec![0, 0, 100, 0]);
    assert_eq!(store.xp("marky"), Some(4 * 2 + 100));
}

#[test]
fn totem_absorbs_strikes_and_ends_silently() {
    let store = TestStore::default();
    let mut session = session();
    session.set_phase(&admin(), 2, 0).expect("phase");
    assert!(session.start_event(&store, EventKind::Totem, 0));
    let boss_hp = session.boss().hp();
    session.drain_events();

    // 120 + 2 * 40 HP; an unskilled strike deals 6.
    let mut destroyed = false;
    for strike in 0..40u64 {
        let who = Actor::viewer(&format!("p{strike}"));
        let outcome = session
            .resolve_action(&store, &who, ActionKind::Totem, 1_000 + strike)
            .expect("strike");
        let totem = outcome.report().and_then(|r| r.totem).expect("totem hit");
        if totem.destroyed {
            destroyed = true;
            break;
        }
    }
    assert!(destroyed);
    assert_eq!(session.boss().hp(), boss_hp);

    let events = session.drain_events();
    assert!(events.iter().any(|e| matches!(e, SessionEvent::TotemDestroyed { .. })));
    let ended = events
        .iter()
        .find(|e| matches!(e, SessionEvent::EventEnded { .. }))
        .expect("ended");
    assert!(!ended.broadcasts());

    let late = session.resolve_action(&store, &Actor::viewer("late"), ActionKind::Totem, 2_000);
    assert_eq!(late, Err(ActionError::TotemInactive));
}
