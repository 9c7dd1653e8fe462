use std::sync::Arc;

use tempfile::tempdir;
use webcheck::{CheckKind, CheckSettings, CheckStore, LibsqlStore, RecoveryPolicy};

use super::{exercise_contract, string_record};
use crate::common::Harness;
use crate::runner::URL;

#[tokio::test]
async fn test_libsql_store_contract() {
    let dir = tempdir().unwrap();
    let store = LibsqlStore::open(dir.path().join("checks.db")).await.unwrap();

    exercise_contract(&store).await;
}

#[tokio::test]
async fn test_records_survive_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("checks.db");

    let store = LibsqlStore::open(&path).await.unwrap();
    let mut record = string_record("https://shop.example");
    record.id = Some(store.insert(&record).await.unwrap());
    drop(store);

    // Reopening runs migrations again; they must be a no-op
    let reopened = LibsqlStore::open(&path).await.unwrap();
    assert_eq!(reopened.list_all(CheckKind::Presence).await.unwrap(), vec![record]);
}

#[tokio::test]
async fn test_pass_over_libsql_store() {
    let dir = tempdir().unwrap();
    let store = Arc::new(LibsqlStore::open(dir.path().join("checks.db")).await.unwrap());
    let h = Harness::with_store(store, RecoveryPolicy::default());

    h.fetcher.serve(URL, "<p>first</p>");
    h.orchestrator.add_hash(URL, &CheckSettings::default()).await.unwrap();
    h.fetcher.serve(URL, "<p>second</p>");

    let report = h.orchestrator.run_pass(10_000).await;

    assert_eq!(report.changed, 1);
    assert_eq!(h.notifier.take(), vec![format!("The content hash for {URL} has changed")]);
    assert_eq!(h.single(CheckKind::Hash).await.run_after, 13_600);
}
