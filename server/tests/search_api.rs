//! Integration tests for the HTTP API via the in-process router.

mod helpers;

use axum::http::StatusCode;
use helpers::TestHarness;

// ---------------------------------------------------------------------------
// /search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_returns_wire_shaped_results() {
    let h = TestHarness::seeded();
    let (status, body) = h.get("/search?q=editor&log=false").await;
    assert_eq!(status, StatusCode::OK);

    let hits = body.as_array().expect("array");
    assert_eq!(hits.len(), 1);
    let hit = &hits[0];
    assert_eq!(hit["id"], 4);
    assert_eq!(hit["title"], "Writing your first article");
    assert_eq!(hit["category_name"], "Tutorials");
    assert_eq!(hit["updated_at"], "2024-03-18T12:00:00");
    let preview = hit["preview"].as_str().unwrap();
    assert!(preview.starts_with("Create Open the editor"), "preview: {preview}");
    assert!(!preview.contains('<'));
}

#[tokio::test]
async fn unmatched_query_is_empty_array() {
    let h = TestHarness::seeded();
    let (status, body) = h.get("/search?q=zzz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn missing_or_overlong_query_is_empty_array() {
    let h = TestHarness::seeded();
    let (_, body) = h.get("/search").await;
    assert_eq!(body, serde_json::json!([]));

    let long = "a".repeat(101);
    let (_, body) = h.get(&format!("/search?q={long}&log=true")).await;
    assert_eq!(body, serde_json::json!([]));
    assert!(h.logged_terms().is_empty(), "over-long query must not be logged");
}

#[tokio::test]
async fn encoded_query_is_decoded() {
    let h = TestHarness::seeded();
    let (_, body) = h.get("/search?q=first%20article").await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[tokio::test]
async fn only_flagged_searches_are_logged() {
    let h = TestHarness::seeded();
    h.get("/search?q=inst&log=false").await;
    h.get("/search?q=insta").await;
    h.get("/search?q=install&log=true").await;
    assert_eq!(h.logged_terms(), vec!["install"]);
}

#[tokio::test]
async fn search_logs_are_newest_first_with_client_ip() {
    let h = TestHarness::seeded();
    h.get_with("/search?q=install&log=true", &[("x-forwarded-for", "203.0.113.9")]).await;
    h.get("/search?q=zzz&log=true").await;

    let (status, body) = h.get("/api/search-logs").await;
    assert_eq!(status, StatusCode::OK);
    let logs = body.as_array().unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0]["term"], "zzz");
    assert_eq!(logs[0]["results_count"], 0);
    assert_eq!(logs[0]["ip_address"], "unknown");
    assert_eq!(logs[1]["term"], "install");
    assert_eq!(logs[1]["ip_address"], "203.0.113.9");
}

#[tokio::test]
async fn report_summarizes_logged_searches() {
    let h = TestHarness::seeded();
    for q in ["install", "install", "zzz", "editor"] {
        h.get(&format!("/search?q={q}&log=true")).await;
    }
    let (status, report) = h.get("/api/search-report").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["total_searches"], 4);
    assert_eq!(report["no_results_count"], 1);
    assert_eq!(report["no_results_rate"], 25.0);
    assert_eq!(report["popular"][0]["term"], "install");
    assert_eq!(report["popular"][0]["count"], 2);
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_catalog_size() {
    let h = TestHarness::seeded();
    let (status, body) = h.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["articles"], 5);
    assert_eq!(body["categories"], 5);
}

// ---------------------------------------------------------------------------
// Catalog files
// ---------------------------------------------------------------------------

#[tokio::test]
async fn serves_catalog_loaded_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.toml");
    std::fs::write(
        &path,
        r#"
[[category]]
id = 7
name = "Billing"

[[article]]
id = 42
title = "Updating your card"
content = "<p>Open <em>Billing</em> and choose a new payment method.</p>"
category_id = 7
created_at = "2024-06-01T09:00:00"
updated_at = "2024-06-02T10:30:00"
"#,
    )
    .unwrap();

    let catalog = kbsearch_server::load_catalog(Some(&path)).unwrap();
    let h = TestHarness::with_catalog(catalog);
    let (status, body) = h.get("/search?q=payment").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], 42);
    assert_eq!(body[0]["category_name"], "Billing");
    assert_eq!(body[0]["preview"], "Open Billing and choose a new payment method.");
}

#[test]
fn missing_catalog_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(kbsearch_server::load_catalog(Some(&missing)).is_err());
}
