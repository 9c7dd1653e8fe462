//! Storage contract, checked against both backends

mod libsql_tests;
mod memory_tests;

use webcheck::detection::{DiffState, HashState, PresenceState};
use webcheck::{CheckKind, CheckRecord, CheckSettings, CheckStore, Snapshot, StoreError};

fn hash_record(url: &str) -> CheckRecord {
    let snapshot = Snapshot::Hash(HashState { current: "abc".to_string(), previous: None });
    CheckRecord::new(url, snapshot, &CheckSettings::default())
}

fn string_record(url: &str) -> CheckRecord {
    let snapshot = Snapshot::Presence(PresenceState { target: "Sold out".to_string(), present: true });
    CheckRecord::new(url, snapshot, &CheckSettings::default())
}

fn diff_record(url: &str) -> CheckRecord {
    let snapshot = Snapshot::Diff(DiffState { content: "line one\nline two".to_string() });
    CheckRecord::new(url, snapshot, &CheckSettings::default())
}

/// Behavior every `CheckStore` must share
pub async fn exercise_contract(store: &dyn CheckStore) {
    let first = store.insert(&hash_record("https://a.example")).await.unwrap();
    let second = store.insert(&hash_record("https://b.example")).await.unwrap();
    store.insert(&string_record("https://a.example")).await.unwrap();
    store.insert(&diff_record("https://a.example")).await.unwrap();
    assert!(first < second);

    // Duplicate within a kind leaves the stored record untouched
    let mut clash = hash_record("https://a.example");
    clash.snapshot = Snapshot::Hash(HashState { current: "zzz".to_string(), previous: None });
    assert!(matches!(store.insert(&clash).await, Err(StoreError::Duplicate { kind: CheckKind::Hash, .. })));

    let hashes = store.list_all(CheckKind::Hash).await.unwrap();
    assert_eq!(hashes.iter().map(|r| r.id.unwrap()).collect::<Vec<_>>(), vec![first, second]);
    assert_eq!(hashes[0].snapshot, hash_record("").snapshot);

    // Every field survives an update
    let mut updated = hashes[0].clone();
    updated.snapshot = Snapshot::Hash(HashState {
        current: "def".to_string(),
        previous: Some("abc".to_string()),
    });
    updated.failed_since = Some(1_700_000_000);
    updated.run_after = 500;
    updated.max_down_time = -1;
    store.update(&updated).await.unwrap();

    let due = store.find_due(CheckKind::Hash, 500).await.unwrap();
    assert_eq!(due.iter().map(|r| r.id.unwrap()).collect::<Vec<_>>(), vec![second]);
    let due = store.find_due(CheckKind::Hash, 501).await.unwrap();
    assert_eq!(due[0], updated);

    let strings = store.list_all(CheckKind::Presence).await.unwrap();
    assert_eq!(strings[0].snapshot, string_record("").snapshot);
    let diffs = store.list_all(CheckKind::Diff).await.unwrap();
    assert_eq!(diffs[0].snapshot, diff_record("").snapshot);

    // Deletes are scoped to their kind
    assert!(store.delete(CheckKind::Hash, "https://a.example").await.unwrap());
    assert!(!store.delete(CheckKind::Hash, "https://a.example").await.unwrap());
    assert_eq!(store.list_all(CheckKind::Presence).await.unwrap().len(), 1);

    assert!(matches!(store.update(&updated).await, Err(StoreError::NotFound { .. })));
    assert!(matches!(
        store.update(&hash_record("https://new.example")).await,
        Err(StoreError::NotPersistent { .. })
    ));
}
