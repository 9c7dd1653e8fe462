//! Adding, deleting and importing checks

use std::time::Duration;

use webcheck::normalize::digest;
use webcheck::{
    CheckKind, CheckSettings, FetchOutcome, ImportError, Snapshot, WebCheckError, unix_now,
};

use super::URL;
use crate::common::Harness;

#[tokio::test]
async fn test_new_check_is_due_and_healthy() {
    let h = Harness::new();
    h.fetcher.serve(URL, "<p>hello</p>");

    let record = h.orchestrator.add_hash(URL, &CheckSettings::default()).await.unwrap();

    assert!(record.id.is_some());
    assert_eq!(record.run_after, 0);
    assert_eq!(record.failed_since, None);
    assert_eq!(h.store.find_due(CheckKind::Hash, 1).await.unwrap(), vec![record]);
}

#[tokio::test]
async fn test_duplicate_add_keeps_one_record() {
    let h = Harness::new();
    h.fetcher.serve(URL, "<p>hello</p>");

    h.orchestrator.add_hash(URL, &CheckSettings::default()).await.unwrap();
    let second = h.orchestrator.add_hash(URL, &CheckSettings::default()).await;

    assert!(matches!(
        second,
        Err(WebCheckError::DuplicateKey { kind: CheckKind::Hash, ref url }) if url == URL
    ));
    assert_eq!(h.store.list_all(CheckKind::Hash).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_same_url_can_be_watched_by_each_kind() {
    let h = Harness::new();
    h.fetcher.serve(URL, "<p>hello</p>");

    h.orchestrator.add_hash(URL, &CheckSettings::default()).await.unwrap();
    h.orchestrator.add_string(URL, "hello", &CheckSettings::default()).await.unwrap();
    h.orchestrator.add_diff(URL, &CheckSettings::default()).await.unwrap();

    for kind in CheckKind::ALL {
        assert_eq!(h.orchestrator.list(kind).await.unwrap().len(), 1);
    }
}

#[tokio::test]
async fn test_invalid_settings_rejected_before_fetch() {
    let h = Harness::new();
    h.fetcher.serve(URL, "<p>hello</p>");

    let settings = CheckSettings { check_timeout: 0, ..Default::default() };
    let result = h.orchestrator.add_diff(URL, &settings).await;

    assert!(matches!(result, Err(WebCheckError::InvalidConfiguration(_))));
    assert!(h.fetcher.requests().is_empty());
}

#[tokio::test]
async fn test_malformed_url_rejected_before_fetch() {
    let h = Harness::new();

    let result = h.orchestrator.add_hash("example.com/page", &CheckSettings::default()).await;

    assert!(matches!(result, Err(WebCheckError::MalformedUrl { .. })));
    assert!(h.fetcher.requests().is_empty());
}

#[tokio::test]
async fn test_add_requires_status_200() {
    let h = Harness::new();
    h.fetcher.respond(URL, FetchOutcome::Response { status: 404, body: Vec::new(), charset: None });

    let result = h.orchestrator.add_hash(URL, &CheckSettings::default()).await;

    assert!(matches!(result, Err(WebCheckError::BadStatus { status: 404, .. })));
    assert!(h.store.list_all(CheckKind::Hash).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_latin1_page_can_be_watched() {
    let h = Harness::new();
    let latin1 = b"<p>Caf\xe9 menu</p>".to_vec();
    h.fetcher.respond(URL, FetchOutcome::Response { status: 200, body: latin1.clone(), charset: None });
    h.orchestrator.add_hash(URL, &CheckSettings::default()).await.unwrap();

    let declared = "https://declared.example";
    h.fetcher.respond(
        declared,
        FetchOutcome::Response { status: 200, body: latin1, charset: Some("iso-8859-1".to_string()) },
    );
    h.orchestrator.add_string(declared, "Caf\u{e9}", &CheckSettings::default()).await.unwrap();

    let Snapshot::Hash(state) = h.single(CheckKind::Hash).await.snapshot else {
        panic!("expected a hash snapshot");
    };
    assert_eq!(state.current, digest("Caf\u{e9} menu"));
    assert!(matches!(h.single(CheckKind::Presence).await.snapshot, Snapshot::Presence(ref s) if s.present));
}

#[tokio::test]
async fn test_add_reports_unreachable_target() {
    let h = Harness::new();
    h.fetcher.go_down(URL);

    let result = h.orchestrator.add_string(URL, "x", &CheckSettings::default()).await;
    assert!(matches!(result, Err(WebCheckError::ConnectionFailed { .. })));

    h.fetcher.respond(URL, FetchOutcome::Timeout);
    let result = h.orchestrator.add_string(URL, "x", &CheckSettings::default()).await;
    assert!(matches!(result, Err(WebCheckError::Timeout { .. })));
}

#[tokio::test]
async fn test_delete() {
    let h = Harness::new();
    h.fetcher.serve(URL, "<p>hello</p>");
    h.orchestrator.add_diff(URL, &CheckSettings::default()).await.unwrap();

    let missing = h.orchestrator.delete(CheckKind::Hash, URL).await;
    assert!(matches!(missing, Err(WebCheckError::NotFound { kind: CheckKind::Hash, .. })));

    h.orchestrator.delete(CheckKind::Diff, URL).await.unwrap();
    assert!(h.store.find_due(CheckKind::Diff, i64::MAX).await.unwrap().is_empty());
    assert!(matches!(
        h.orchestrator.delete(CheckKind::Diff, URL).await,
        Err(WebCheckError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_import_applies_lines_in_order() {
    let h = Harness::new();
    for url in ["https://a.example", "https://b.example", "https://c.example"] {
        h.fetcher.serve(url, "<p>Sold out</p>");
    }
    let contents = "\
# watched pages
md5|https://a.example
string|Sold out|https://b.example|600|60|5   # shop

diff|https://c.example
hash|https://a.example
";

    let report = h.orchestrator.import(contents, &CheckSettings::default()).await;

    assert!(report.aborted.is_none());
    assert_eq!(report.added(), 3);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.outcomes[3].entry.line_number, 6);
    assert!(matches!(report.outcomes[3].result, Err(WebCheckError::DuplicateKey { .. })));

    let string_check = h.single(CheckKind::Presence).await;
    assert_eq!(string_check.check_frequency, 60);
    assert!(matches!(string_check.snapshot, Snapshot::Presence(ref s) if s.present));
}

#[tokio::test]
async fn test_import_stops_at_malformed_line() {
    let h = Harness::new();
    h.fetcher.serve("https://a.example", "<p>a</p>");
    h.fetcher.serve("https://b.example", "<p>b</p>");
    let contents = "hash|https://a.example\nhash https://nope.example\nhash|https://b.example\n";

    let report = h.orchestrator.import(contents, &CheckSettings::default()).await;

    assert_eq!(
        report.aborted,
        Some(ImportError::Malformed { line_number: 2, line: "hash https://nope.example".to_string() })
    );
    let urls: Vec<String> =
        h.store.list_all(CheckKind::Hash).await.unwrap().into_iter().map(|r| r.url).collect();
    assert_eq!(urls, vec!["https://a.example".to_string()]);
}

#[tokio::test]
async fn test_import_continues_past_unreachable_url() {
    let h = Harness::new();
    h.fetcher.serve("https://b.example", "<p>b</p>");

    let report = h
        .orchestrator
        .import("diff|https://down.example\ndiff|https://b.example\n", &CheckSettings::default())
        .await;

    assert_eq!(report.added(), 1);
    assert!(matches!(report.outcomes[0].result, Err(WebCheckError::ConnectionFailed { .. })));
}

#[tokio::test]
async fn test_watch_loop_stops_on_shutdown() {
    let h = Harness::new();
    h.fetcher.serve(URL, "<p>hello</p>");
    h.orchestrator.add_hash(URL, &CheckSettings::default()).await.unwrap();
    let before = unix_now();

    let stopped = tokio::time::timeout(
        Duration::from_secs(5),
        h.orchestrator.run_forever(
            Duration::from_millis(20),
            tokio::time::sleep(Duration::from_millis(100)),
        ),
    )
    .await;

    assert!(stopped.is_ok());
    assert_eq!(h.fetcher.requests().len(), 2);
    assert!(h.single(CheckKind::Hash).await.run_after >= before + 3_600);
}
