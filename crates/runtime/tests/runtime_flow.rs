use std::sync::Arc;

use boss_core::{
    ActionKind, ActionOutcome, EventKind, EventMeta, PlayerRecord, PlayerStore,
    ProgressionConfig, SessionEvent, SkillAdjustment, StoreError, Timer, Tribute,
};
use boss_core::config::DAY_MS;
use boss_runtime::{Clock, Event, InMemoryPlayerStore, ManualClock, Runtime, RuntimeConfig, Topic};

const START_MS: u64 = 1_700_000_000_000;

async fn runtime_with(store: Arc<dyn PlayerStore + Send + Sync>) -> (Runtime, ManualClock) {
    let clock = ManualClock::new(START_MS);
    let config = RuntimeConfig {
        owner: Some("streamer".into()),
        ..RuntimeConfig::default()
    };
    let runtime = Runtime::builder()
        .config(config)
        .store(store)
        .clock(Arc::new(clock.clone()))
        .rng_seed(7)
        .ticker(false)
        .build()
        .await
        .expect("runtime should start");
    (runtime, clock)
}

#[tokio::test]
async fn attack_is_broadcast_with_toast() {
    let store = Arc::new(InMemoryPlayerStore::new());
    let (runtime, _clock) = runtime_with(store.clone()).await;
    let handle = runtime.handle();
    let mut state_rx = handle.subscribe(Topic::State);

    let alice = handle.actor("alice", "viewer", false);
    let outcome = handle
        .resolve_action(alice.clone(), ActionKind::Attack)
        .await
        .expect("attack");
    assert_eq!(outcome.report().and_then(|r| r.damage()), Some(6));

    let Event::State(broadcast) = state_rx.recv().await.expect("broadcast") else {
        panic!("state topic carries state events");
    };
    assert_eq!(broadcast.toast.as_deref(), Some("alice !attack -> -6"));
    assert_eq!(broadcast.snapshot.boss_hp, 4_994);
    assert!(broadcast.to_json().expect("json").contains("\"boss_hp\":4994"));

    // Still cooling down: nothing changes and nothing is announced.
    let blocked = handle
        .resolve_command(alice, "!attack")
        .await
        .expect("blocked");
    assert!(matches!(blocked, ActionOutcome::CooldownBlocked { .. }));
    assert_eq!(handle.snapshot().await.expect("snapshot").boss_hp, 4_994);
    assert!(state_rx.try_recv().is_err());
    assert_eq!(store.get("alice").expect("get").map(|r| r.xp), Some(2));

    drop(handle);
    runtime.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn owner_runs_admin_commands_and_viewers_cannot() {
    let (runtime, _clock) = runtime_with(Arc::new(InMemoryPlayerStore::new())).await;
    let handle = runtime.handle();

    let viewer = handle.actor("mallory", "viewer", false);
    let err = handle.set_hp(viewer, 1).await.expect_err("forbidden");
    assert_eq!(
        err.action_error().map(|e| e.reason_code()),
        Some("forbidden")
    );

    let owner = handle.actor("streamer", "viewer", false);
    assert_eq!(handle.set_hp(owner.clone(), 10).await.expect("set hp"), 10);
    let hit = handle
        .apply_damage(owner.clone(), "alice", 10, "admin")
        .await
        .expect("damage");
    assert_eq!(hit.defeated_phase, Some(1));

    let snapshot = handle.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.phase, 2);
    assert_eq!(snapshot.boss_hp, 7_000);
    assert_eq!(snapshot.phase_start_ms, START_MS);

    handle.reset_boss(owner).await.expect("reset");
    assert_eq!(handle.snapshot().await.expect("snapshot").phase, 1);
}

#[tokio::test]
async fn events_freeze_while_offline() {
    let (runtime, clock) = runtime_with(Arc::new(InMemoryPlayerStore::new())).await;
    let handle = runtime.handle();
    let owner = handle.actor("streamer", "broadcaster", false);
    let mut session_rx = handle.subscribe(Topic::Session);

    handle.set_phase(owner, 2).await.expect("phase");
    assert!(handle.start_event(EventKind::Shield).await.expect("start"));

    clock.advance(60_000);
    assert!(handle.set_stream_live(false).await.expect("offline"));
    clock.advance(600_000);
    handle.tick().await.expect("tick");

    let event = handle
        .snapshot()
        .await
        .expect("snapshot")
        .active_event
        .expect("shield survives the pause");
    assert_eq!(event.title, "Break the Shield");
    assert_eq!(
        event.timer,
        Timer::Paused {
            remaining_ms: 240_000
        }
    );

    assert!(handle.set_stream_live(true).await.expect("live"));
    let resumed = handle.snapshot().await.expect("snapshot");
    let timer = resumed.active_event.expect("active").timer;
    assert_eq!(timer.remaining_ms(clock.now_ms()), 240_000);

    let mut seen = Vec::new();
    while let Ok(Event::Session(event)) = session_rx.try_recv() {
        seen.push(event);
    }
    assert!(seen.contains(&SessionEvent::StreamChanged { live: false }));
    assert!(seen.contains(&SessionEvent::StreamChanged { live: true }));
}

#[tokio::test]
async fn donation_chaos_reaches_viewers() {
    let (runtime, _clock) = runtime_with(Arc::new(InMemoryPlayerStore::new())).await;
    let handle = runtime.handle();
    let mut state_rx = handle.subscribe(Topic::State);

    let report = handle
        .tribute(Tribute::donation("dana", 20))
        .await
        .expect("donation");
    assert_eq!(report.damage, 50);
    let chaos = report.chaos.expect("chaos rolled");

    let mut carried = None;
    while let Ok(Event::State(broadcast)) = state_rx.try_recv() {
        if broadcast.chaos.is_some() {
            carried = broadcast.chaos;
        }
    }
    assert_eq!(carried, Some(chaos));
}

#[tokio::test]
async fn broadcasts_carry_leaderboards() {
    let store = Arc::new(InMemoryPlayerStore::new());
    let (runtime, clock) = runtime_with(store.clone()).await;
    let handle = runtime.handle();
    let mut state_rx = handle.subscribe(Topic::State);

    // Yesterday's damage must not count today.
    handle
        .tribute(Tribute::follow("olga"))
        .await
        .expect("follow");
    clock.advance(DAY_MS);
    handle
        .resolve_action(handle.actor("alice", "", false), ActionKind::Attack)
        .await
        .expect("attack");
    handle
        .tribute(Tribute::donation("dana", 20))
        .await
        .expect("donation");

    let mut last = None;
    while let Ok(Event::State(broadcast)) = state_rx.try_recv() {
        last = Some(broadcast);
    }
    let boards = last.expect("state broadcast").snapshot.leaderboards;
    let damage: Vec<_> = boards
        .top_damage
        .iter()
        .map(|row| (row.username.as_str(), row.damage))
        .collect();
    assert_eq!(damage, vec![("dana", 50), ("alice", 6)]);
    assert_eq!(boards.top_xp.len(), 3);
    assert_eq!(boards.top_xp[0].username, "dana");

    let snapshot = handle.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.leaderboards, boards);
}

#[tokio::test]
async fn owner_grants_and_resets_xp() {
    let store = Arc::new(InMemoryPlayerStore::new());
    let (runtime, _clock) = runtime_with(store.clone()).await;
    let handle = runtime.handle();
    let owner = handle.actor("streamer", "", false);
    let mut state_rx = handle.subscribe(Topic::State);

    let grace = handle
        .add_xp(owner.clone(), "grace", 2_500_000)
        .await
        .expect("grant");
    assert_eq!(grace.xp, 1_000_000);
    let Event::State(broadcast) = state_rx.recv().await.expect("broadcast") else {
        panic!("state topic carries state events");
    };
    assert_eq!(
        broadcast.toast.as_deref(),
        Some("grace +1000000 XP by streamer")
    );
    assert_eq!(broadcast.snapshot.leaderboards.top_xp[0].xp, 1_000_000);

    handle
        .resolve_action(handle.actor("grace", "", false), ActionKind::Attack)
        .await
        .expect("attack");
    assert_eq!(handle.reset_xp(owner.clone()).await.expect("reset"), 1);
    let grace = store.get("grace").expect("get").expect("grace");
    assert_eq!((grace.xp, grace.level, grace.last_attack_ms), (0, 1, 0));

    assert_eq!(handle.reset_all_skills(owner).await.expect("skills"), 1);
    let viewer = handle.actor("grace", "", false);
    let err = handle.reset_xp(viewer).await.expect_err("forbidden");
    assert_eq!(err.action_error().map(|e| e.reason_code()), Some("forbidden"));
}

struct RefusingStore;

impl PlayerStore for RefusingStore {
    fn get(&self, _: &str) -> Result<Option<PlayerRecord>, StoreError> {
        Ok(None)
    }

    fn upsert(&self, _: &PlayerRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk full".into()))
    }

    fn top_by_xp(&self, _: usize) -> Result<Vec<PlayerRecord>, StoreError> {
        Ok(Vec::new())
    }

    fn known_usernames(&self, _: usize) -> Result<Vec<String>, StoreError> {
        Ok(Vec::new())
    }

    fn top_hitters_since(&self, _: u64, _: usize) -> Result<Vec<PlayerRecord>, StoreError> {
        Ok(Vec::new())
    }

    fn update_all(&self, _: &mut dyn FnMut(&mut PlayerRecord)) -> Result<usize, StoreError> {
        Err(StoreError::Unavailable("disk full".into()))
    }
}

#[tokio::test]
async fn store_failure_is_reported_and_boss_untouched() {
    let (runtime, _clock) = runtime_with(Arc::new(RefusingStore)).await;
    let handle = runtime.handle();
    let mut state_rx = handle.subscribe(Topic::State);

    let err = handle
        .resolve_action(handle.actor("alice", "", false), ActionKind::Attack)
        .await
        .expect_err("store refuses writes");
    assert_eq!(
        err.action_error().map(|e| e.reason_code()),
        Some("store_unavailable")
    );
    assert_eq!(handle.snapshot().await.expect("snapshot").boss_hp, 5_000);
    assert!(state_rx.try_recv().is_err());
}

#[tokio::test]
async fn owner_pauses_and_tunes_players() {
    let mut bob = PlayerRecord::new("bob", &ProgressionConfig::default());
    bob.skill = 5;
    bob.skill_tries = 12;
    let store = Arc::new(InMemoryPlayerStore::with_records([bob]));
    let (runtime, _clock) = runtime_with(store.clone()).await;
    let handle = runtime.handle();
    let moderator = handle.actor("mo", "moderator", false);
    let owner = handle.actor("streamer", "", false);

    let err = handle
        .set_paused(moderator, true)
        .await
        .expect_err("moderators cannot pause");
    assert_eq!(err.action_error().map(|e| e.reason_code()), Some("forbidden"));

    handle.set_paused(owner.clone(), true).await.expect("pause");
    let err = handle
        .resolve_action(handle.actor("alice", "", false), ActionKind::Attack)
        .await
        .expect_err("paused");
    assert_eq!(err.action_error().map(|e| e.reason_code()), Some("paused"));
    handle.set_paused(owner.clone(), false).await.expect("resume");

    let adjustment: SkillAdjustment = "DEC".parse().expect("adjustment");
    let bob = handle
        .adjust_skill(owner.clone(), "bob", adjustment)
        .await
        .expect("adjust");
    assert_eq!((bob.skill, bob.skill_tries), (4, 0));
    assert_eq!(store.get("bob").expect("get"), Some(bob));

    handle
        .apply_damage(owner.clone(), "bob", 40, "admin")
        .await
        .expect("damage");
    handle.clear_hits(owner.clone()).await.expect("clear");
    assert!(handle.snapshot().await.expect("snapshot").last_hits.is_empty());

    handle.touch_activity("dora").await.expect("touch");
    handle.set_phase(owner, 2).await.expect("phase");
    assert!(handle.start_event(EventKind::Mark).await.expect("mark"));
    let meta = handle
        .snapshot()
        .await
        .expect("snapshot")
        .active_event
        .map(|event| event.meta);
    assert!(matches!(meta, Some(EventMeta::Mark(mark)) if mark.marked_user == "dora"));
}

#[tokio::test]
async fn started_runtime_serves_both_topics() {
    let config = RuntimeConfig {
        rng_seed: Some(9),
        tick_interval_ms: 0,
        ..RuntimeConfig::default()
    };
    let runtime = Runtime::start(config).await.expect("start");
    let handle = runtime.handle();
    let mut receivers = handle.subscribe_multiple(&[Topic::State, Topic::Session]);

    handle
        .tribute(Tribute::follow("fern"))
        .await
        .expect("follow");

    let state = receivers
        .get_mut(&Topic::State)
        .expect("state receiver")
        .recv()
        .await
        .expect("state event");
    assert_eq!(state.topic(), Topic::State);
    let session = receivers
        .get_mut(&Topic::Session)
        .expect("session receiver")
        .recv()
        .await
        .expect("session event");
    assert!(matches!(
        session,
        Event::Session(SessionEvent::TributeApplied { damage: 20, .. })
    ));
    // Late subscribers do not see earlier events.
    let mut late = handle.event_bus().subscribe(Topic::Session);
    assert!(late.try_recv().is_err());

    drop(handle);
    runtime.shutdown().await.expect("shutdown");
}
