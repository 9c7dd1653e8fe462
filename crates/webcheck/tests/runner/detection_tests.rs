//! Change detection through full passes

use webcheck::detection::HashState;
use webcheck::normalize::digest;
use webcheck::{CheckKind, CheckSettings, PassReport, Snapshot};

use super::URL;
use crate::common::Harness;

#[tokio::test]
async fn test_hash_identical_content_is_silent() {
    let h = Harness::new();
    h.fetcher.serve(URL, "<p>Hello</p>");
    h.orchestrator.add_hash(URL, &CheckSettings::default()).await.unwrap();
    let seeded = h.single(CheckKind::Hash).await.snapshot;

    let first = h.orchestrator.run_pass(10_000).await;
    let second = h.orchestrator.run_pass(20_000).await;

    assert_eq!(first, PassReport { checked: 1, ..Default::default() });
    assert_eq!(second, PassReport { checked: 1, ..Default::default() });
    assert!(h.notifier.messages().is_empty());
    assert_eq!(h.single(CheckKind::Hash).await.snapshot, seeded);
}

#[tokio::test]
async fn test_hash_change_then_revert() {
    let h = Harness::new();
    h.fetcher.serve(URL, "<p>version A</p>");
    h.orchestrator.add_hash(URL, &CheckSettings::default()).await.unwrap();

    h.fetcher.serve(URL, "<p>version B</p>");
    let report = h.orchestrator.run_pass(10_000).await;
    assert_eq!(report.changed, 1);

    h.fetcher.serve(URL, "<p>version A</p>");
    h.orchestrator.run_pass(20_000).await;

    assert_eq!(
        h.notifier.take(),
        vec![
            format!("The content hash for {URL} has changed"),
            format!("The content hash for {URL} has been reverted"),
        ]
    );
    assert_eq!(
        h.single(CheckKind::Hash).await.snapshot,
        Snapshot::Hash(HashState {
            current: digest("version A"),
            previous: Some(digest("version B")),
        })
    );
}

#[tokio::test]
async fn test_hash_ignores_link_targets() {
    let h = Harness::new();
    h.fetcher.serve(URL, r#"<p>See <a href="/news?session=1">the news</a></p>"#);
    h.orchestrator.add_hash(URL, &CheckSettings::default()).await.unwrap();

    h.fetcher.serve(URL, r#"<p>See <a href="/news?session=2">the news</a></p>"#);
    h.orchestrator.run_pass(10_000).await;

    assert!(h.notifier.messages().is_empty());
}

#[tokio::test]
async fn test_string_presence_flips() {
    let h = Harness::new();
    h.fetcher.serve(URL, "<p>Nothing to see</p>");
    let record = h.orchestrator.add_string(URL, "foo", &CheckSettings::default()).await.unwrap();
    assert!(matches!(record.snapshot, Snapshot::Presence(ref s) if !s.present));

    h.fetcher.serve(URL, "<p>Now with foo inside</p>");
    h.orchestrator.run_pass(10_000).await;
    assert_eq!(h.notifier.take(), vec![format!("foo is now present on {URL}")]);
    assert!(matches!(h.single(CheckKind::Presence).await.snapshot, Snapshot::Presence(ref s) if s.present));

    // Still present: nothing new to say
    h.orchestrator.run_pass(20_000).await;
    assert!(h.notifier.take().is_empty());

    h.fetcher.serve(URL, "<p>Gone again</p>");
    h.orchestrator.run_pass(30_000).await;
    assert_eq!(h.notifier.take(), vec![format!("foo is no longer present on {URL}")]);
}

#[tokio::test]
async fn test_diff_reports_replaced_line_with_context() {
    let h = Harness::new();
    h.fetcher.serve(URL, "<p>A</p><p>B</p><p>C</p>");
    h.orchestrator.add_diff(URL, &CheckSettings::default()).await.unwrap();

    h.fetcher.serve(URL, "<p>A</p><p>X</p><p>C</p>");
    h.orchestrator.run_pass(10_000).await;

    let expected = [
        format!("*** Old content for {URL}"),
        format!("--- New content for {URL}"),
        "***************".to_string(),
        "*** 1,3 ****".to_string(),
        "  A".to_string(),
        "! B".to_string(),
        "  C".to_string(),
        "--- 1,3 ----".to_string(),
        "  A".to_string(),
        "! X".to_string(),
        "  C".to_string(),
    ]
    .join("\n");
    assert_eq!(h.notifier.take(), vec![expected]);

    let Snapshot::Diff(state) = h.single(CheckKind::Diff).await.snapshot else {
        panic!("expected a diff snapshot");
    };
    assert_eq!(state.content, "A\nX\nC");
}

#[tokio::test]
async fn test_only_due_checks_are_polled() {
    let h = Harness::new();
    h.fetcher.serve(URL, "<p>Hello</p>");
    let settings = CheckSettings { check_frequency: 600, ..Default::default() };
    h.orchestrator.add_hash(URL, &settings).await.unwrap();

    assert_eq!(h.orchestrator.run_pass(10_000).await.checked, 1);
    assert_eq!(h.orchestrator.run_pass(10_599).await.checked, 0);
    assert_eq!(h.orchestrator.run_pass(10_600).await.checked, 0);
    assert_eq!(h.orchestrator.run_pass(10_601).await.checked, 1);
}

#[tokio::test]
async fn test_kinds_are_polled_hash_then_string_then_diff() {
    let h = Harness::new();
    let urls = ["https://a.example", "https://b.example", "https://c.example"];
    for url in urls {
        h.fetcher.serve(url, "<p>page</p>");
    }
    h.orchestrator.add_diff(urls[0], &CheckSettings::default()).await.unwrap();
    h.orchestrator.add_string(urls[1], "x", &CheckSettings::default()).await.unwrap();
    h.orchestrator.add_hash(urls[2], &CheckSettings::default()).await.unwrap();
    let added = h.fetcher.requests().len();

    h.orchestrator.run_pass(10_000).await;

    assert_eq!(&h.fetcher.requests()[added..], &[urls[2], urls[1], urls[0]]);
}
