use std::fs;
use std::sync::Arc;

use boss_core::{ActionKind, PlayerRecord, PlayerStore, ProgressionConfig};
use boss_runtime::{FilePlayerStore, ManualClock, RepositoryError, Runtime};

fn record(name: &str, xp: u64) -> PlayerRecord {
    let mut record = PlayerRecord::new(name, &ProgressionConfig::default());
    record.xp = xp;
    record
}

#[test]
fn records_survive_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");

    let store = FilePlayerStore::open(dir.path()).expect("open");
    store.upsert(&record("alice", 40)).expect("upsert");
    store.upsert(&record("bob", 90)).expect("upsert");
    store.upsert(&record("alice", 120)).expect("upsert");
    drop(store);

    let reopened = FilePlayerStore::open(dir.path()).expect("reopen");
    assert_eq!(reopened.get("alice").expect("get").map(|r| r.xp), Some(120));
    let ranked: Vec<_> = reopened
        .top_by_xp(10)
        .expect("top")
        .into_iter()
        .map(|r| r.username)
        .collect();
    assert_eq!(ranked, ["alice", "bob"]);
    assert_eq!(
        reopened.known_usernames(1).expect("known"),
        vec!["alice".to_owned()]
    );
    assert!(!reopened.path().with_extension("bin.tmp").exists());
}

#[test]
fn corrupted_file_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("players.bin"), [0xff, 0xff, 0xff]).expect("write");

    let err = FilePlayerStore::open(dir.path()).expect_err("garbage must not load");
    assert!(matches!(err, RepositoryError::CorruptedData(_)));
}

#[tokio::test]
async fn runtime_writes_progress_through_file_store() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(FilePlayerStore::open(dir.path()).expect("open"));

    let runtime = Runtime::builder()
        .store(store)
        .clock(Arc::new(ManualClock::new(5_000_000)))
        .rng_seed(3)
        .ticker(false)
        .build()
        .await
        .expect("runtime");
    let handle = runtime.handle();
    handle
        .resolve_action(handle.actor("carol", "subscriber", true), ActionKind::Heal)
        .await
        .expect("heal");
    drop(handle);
    runtime.shutdown().await.expect("shutdown");

    let reopened = FilePlayerStore::open(dir.path()).expect("reopen");
    let carol = reopened.get("carol").expect("get").expect("carol saved");
    assert_eq!(carol.xp, 5);
    assert_eq!(carol.last_heal_ms, 5_000_000);
}
