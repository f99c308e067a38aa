//! End-to-end behavior of a search session under a paused clock.
//!
//! Each test spawns a session over a `ScriptedTransport`, feeds it input
//! events at chosen instants, and checks what was sent and what is shown.

mod helpers;

use std::sync::Arc;

use helpers::{advance, hit, Reply, ScriptedTransport};
use kbsearch_core::render::{ERROR_NOTICE, NO_RESULTS_GUIDANCE};
use kbsearch_core::{spawn_session, PanelBody, PointerTarget, SearchConfig};

fn titles(body: &Option<PanelBody>) -> Vec<String> {
    match body {
        Some(PanelBody::Results { items }) => items.iter().map(|i| i.title.clone()).collect(),
        other => panic!("expected results, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Debounce and validation
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn eligible_input_dispatches_after_idle_interval() {
    let transport = Arc::new(ScriptedTransport::new());
    let session = spawn_session(&SearchConfig::default(), transport.clone());

    session.keystroke("ab");
    advance(299).await;
    assert!(transport.calls().is_empty(), "dispatched before the debounce interval");

    advance(2).await;
    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].text, "ab");
    assert_eq!(calls[0].seq, 1);
    assert!(!calls[0].log);

    let report = session.close().await;
    assert_eq!(report.stats.dispatched, 1);
    assert!(report.view.visible);
}

#[tokio::test(start_paused = true)]
async fn single_char_hides_panel_without_request() {
    let transport = Arc::new(ScriptedTransport::new().route("cat", 0, Reply::Hits(vec![hit(1, "Cats")])));
    let session = spawn_session(&SearchConfig::default(), transport.clone());

    session.submit("cat");
    advance(10).await;
    assert!(session.view().visible);

    session.keystroke("c");
    advance(1).await;
    assert!(!session.view().visible, "panel should hide immediately");

    advance(1000).await;
    assert_eq!(transport.calls().len(), 1, "no request for an ineligible query");

    let report = session.close().await;
    assert_eq!(report.stats.withdrawn, 1);
}

#[tokio::test(start_paused = true)]
async fn keystroke_burst_sends_one_request_for_final_value() {
    let transport = Arc::new(ScriptedTransport::new());
    let session = spawn_session(&SearchConfig::default(), transport.clone());

    session.keystroke("c");
    advance(100).await;
    session.keystroke("ca");
    advance(100).await;
    session.keystroke("cat");
    advance(1000).await;

    let calls = transport.calls();
    assert_eq!(calls.len(), 1, "burst produced {calls:?}");
    assert_eq!(calls[0].text, "cat");
    session.close().await;
}

#[tokio::test(start_paused = true)]
async fn trailing_whitespace_is_trimmed_before_sending() {
    let transport = Arc::new(ScriptedTransport::new());
    let session = spawn_session(&SearchConfig::default(), transport.clone());

    session.keystroke("  install guide  ");
    advance(400).await;
    assert_eq!(transport.calls()[0].text, "install guide");
    session.close().await;
}

// ---------------------------------------------------------------------------
// Logging intent
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn submit_logs_and_typing_does_not() {
    let transport = Arc::new(ScriptedTransport::new());
    let session = spawn_session(&SearchConfig::default(), transport.clone());

    session.keystroke("api");
    advance(400).await;
    session.submit("api reference");
    advance(10).await;
    session.keystroke("api ref");
    advance(400).await;

    let flags: Vec<(String, bool)> =
        transport.calls().into_iter().map(|c| (c.text, c.log)).collect();
    assert_eq!(
        flags,
        vec![
            ("api".to_string(), false),
            ("api reference".to_string(), true),
            ("api ref".to_string(), false),
        ]
    );
    let report = session.close().await;
    assert_eq!(report.stats.logged, 1);
    assert_eq!(report.last_dispatched, 3);
}

#[tokio::test(start_paused = true)]
async fn submit_cancels_pending_debounce() {
    let transport = Arc::new(ScriptedTransport::new());
    let session = spawn_session(&SearchConfig::default(), transport.clone());

    session.keystroke("faq");
    advance(100).await;
    session.submit("faq");
    advance(1000).await;

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].log);
    session.close().await;
}

// ---------------------------------------------------------------------------
// Rendering outcomes
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn empty_result_shows_no_results_notice() {
    let transport = Arc::new(ScriptedTransport::new().route("zzz", 20, Reply::Hits(vec![])));
    let session = spawn_session(&SearchConfig::default(), transport.clone());

    session.submit("zzz");
    advance(5).await;
    assert_eq!(session.view().body, Some(PanelBody::Loading));

    advance(50).await;
    let view = session.view();
    assert!(view.visible);
    assert_eq!(
        view.body,
        Some(PanelBody::NoResults {
            message: "No results found for \"zzz\"".to_string(),
            guidance: NO_RESULTS_GUIDANCE.to_string(),
        })
    );
    session.close().await;
}

#[tokio::test(start_paused = true)]
async fn failure_renders_notice_and_is_superseded_by_later_success() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .route("broken", 10, Reply::Fail(500))
            .route("fixed", 10, Reply::Hits(vec![hit(2, "Fixed article")])),
    );
    let session = spawn_session(&SearchConfig::default(), transport.clone());

    session.submit("broken");
    advance(50).await;
    assert_eq!(
        session.view().body,
        Some(PanelBody::Error { message: ERROR_NOTICE.to_string() })
    );

    session.submit("fixed");
    advance(50).await;
    assert_eq!(titles(&session.view().body), vec!["Fixed article"]);

    let report = session.close().await;
    assert_eq!(report.stats.failures, 1);
    assert_eq!(report.stats.accepted, 2);
}

#[tokio::test(start_paused = true)]
async fn server_text_is_escaped_on_the_panel() {
    let transport = Arc::new(
        ScriptedTransport::new().route("xss", 0, Reply::Hits(vec![hit(9, "<script>alert(1)</script>")])),
    );
    let session = spawn_session(&SearchConfig::default(), transport.clone());

    session.submit("xss");
    advance(10).await;
    assert_eq!(titles(&session.view().body), vec!["&lt;script&gt;alert(1)&lt;/script&gt;"]);
    session.close().await;
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn late_response_for_older_query_is_discarded() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .route("cat", 500, Reply::Hits(vec![hit(1, "Cats")]))
            .route("category", 50, Reply::Hits(vec![hit(2, "Category guide")])),
    );
    let session = spawn_session(&SearchConfig::default(), transport.clone());

    // "cat" dispatched at t=300, answers at t=800
    session.keystroke("cat");
    advance(350).await;
    // "category" dispatched at t=650, answers at t=700
    session.keystroke("category");
    advance(400).await;

    let view = session.view();
    assert_eq!(view.seq, Some(2));
    assert_eq!(titles(&view.body), vec!["Category guide"]);

    advance(200).await;
    let view = session.view();
    assert_eq!(view.seq, Some(2), "older response overwrote newer results");
    assert_eq!(titles(&view.body), vec!["Category guide"]);

    let report = session.close().await;
    assert_eq!(report.stats.stale, 1);
    assert_eq!(report.stats.accepted, 1);
}

#[tokio::test(start_paused = true)]
async fn older_response_arriving_first_is_shown_until_newer_arrives() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .route("tut", 10, Reply::Hits(vec![hit(1, "Tutorial one")]))
            .route("tutorial", 100, Reply::Hits(vec![hit(2, "Tutorial two")])),
    );
    let session = spawn_session(&SearchConfig::default(), transport.clone());

    session.submit("tut");
    session.submit("tutorial");
    advance(50).await;
    assert_eq!(titles(&session.view().body), vec!["Tutorial one"]);

    advance(100).await;
    assert_eq!(titles(&session.view().body), vec!["Tutorial two"]);
    assert_eq!(session.view().seq, Some(2));
    session.close().await;
}

// ---------------------------------------------------------------------------
// Visibility
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn outside_click_hides_and_late_response_does_not_reopen() {
    let transport =
        Arc::new(ScriptedTransport::new().route("guide", 200, Reply::Hits(vec![hit(1, "Guide")])));
    let session = spawn_session(&SearchConfig::default(), transport.clone());

    session.submit("guide");
    advance(10).await;
    assert!(session.view().visible);

    session.pointer(PointerTarget::Panel);
    advance(10).await;
    assert!(session.view().visible, "clicks inside the panel keep it open");

    session.pointer(PointerTarget::Outside);
    advance(10).await;
    assert!(!session.view().visible);

    advance(300).await;
    let view = session.view();
    assert!(!view.visible);
    assert_eq!(titles(&view.body), vec!["Guide"]);

    session.submit("guide");
    advance(300).await;
    assert!(session.view().visible, "a new dispatch reopens the panel");
    session.close().await;
}

// ---------------------------------------------------------------------------
// Optional cancellation
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn abort_superseded_drops_older_in_flight_request() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .route("cat", 500, Reply::Hits(vec![hit(1, "Cats")]))
            .route("category", 50, Reply::Hits(vec![hit(2, "Category guide")])),
    );
    let config = SearchConfig { abort_superseded: true, ..SearchConfig::default() };
    let session = spawn_session(&config, transport.clone());

    session.submit("cat");
    advance(10).await;
    session.submit("category");
    advance(1000).await;

    assert_eq!(transport.calls().len(), 2);
    assert_eq!(titles(&session.view().body), vec!["Category guide"]);

    let report = session.close().await;
    assert_eq!(report.stats.aborted, 1);
    assert_eq!(report.stats.stale, 0, "aborted request never reached the reconciler");
}

#[tokio::test(start_paused = true)]
async fn custom_debounce_and_bounds_from_config() {
    let transport = Arc::new(ScriptedTransport::new());
    let config = SearchConfig { debounce_ms: 100, min_query_len: 3, ..SearchConfig::default() };
    let session = spawn_session(&config, transport.clone());

    session.keystroke("ab");
    advance(500).await;
    assert!(transport.calls().is_empty());

    session.keystroke("abc");
    advance(101).await;
    assert_eq!(transport.calls().len(), 1);
    session.close().await;
}
