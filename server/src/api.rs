use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Json, Query, State},
    http::{Extensions, HeaderMap, StatusCode},
    response::IntoResponse,
};
use kbsearch_core::validate::MAX_QUERY_LENGTH;
use kbsearch_core::SearchResult;
use serde::Deserialize;
use tracing::{debug, error};

use crate::types::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Query-string booleans as browsers send them: `true`/`1`, anything else is false.
fn parse_flag(raw: Option<&str>) -> bool {
    matches!(raw.map(|s| s.trim().to_ascii_lowercase()).as_deref(), Some("true") | Some("1"))
}

/// First `X-Forwarded-For` hop, else the socket peer, else `unknown`.
fn client_ip(headers: &HeaderMap, extensions: &Extensions) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next().map(str::trim).filter(|s| !s.is_empty()) {
            return first.to_string();
        }
    }
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    q: String,
    log: Option<String>,
}

/// `GET /search?q=<text>&log=<bool>`
///
/// Always answers with a JSON array. A search is recorded only when `log` is
/// set and the term is one the endpoint would actually run.
pub async fn api_search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
    headers: HeaderMap,
    extensions: Extensions,
) -> Json<Vec<SearchResult>> {
    let results = state.catalog.search(&params.q);
    let term = params.q.trim();
    let should_log = parse_flag(params.log.as_deref());
    debug!(q = term, log = should_log, hits = results.len(), "Search");

    if should_log && !term.is_empty() && term.chars().count() <= MAX_QUERY_LENGTH {
        let entry = SearchLog {
            term: term.to_string(),
            results_count: results.len(),
            created_at: chrono::Utc::now().naive_utc(),
            ip_address: client_ip(&headers, &extensions),
        };
        match state.search_logs.write() {
            Ok(mut logs) => logs.push(entry),
            Err(_) => error!("Search log lock poisoned; dropping entry"),
        }
    }

    Json(results)
}

// ---------------------------------------------------------------------------
// Search log reporting
// ---------------------------------------------------------------------------

fn read_logs(state: &AppState) -> Result<Vec<SearchLog>, (StatusCode, Json<serde_json::Value>)> {
    state.search_logs.read().map(|logs| logs.clone()).map_err(|_| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "Search log unavailable" })),
        )
    })
}

/// `GET /api/search-logs`: every logged search, newest first.
pub async fn api_search_logs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SearchLog>>, (StatusCode, Json<serde_json::Value>)> {
    let mut logs = read_logs(&state)?;
    logs.reverse();
    logs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(logs))
}

/// `GET /api/search-report`
pub async fn api_search_report(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SearchReport>, (StatusCode, Json<serde_json::Value>)> {
    let logs = read_logs(&state)?;
    Ok(Json(build_report(&logs)))
}

/// Totals, average hit count, zero-hit rate, and the ten most frequent terms.
pub fn build_report(logs: &[SearchLog]) -> SearchReport {
    let total = logs.len();
    let no_results = logs.iter().filter(|l| l.results_count == 0).count();
    let avg_results = if total > 0 {
        logs.iter().map(|l| l.results_count).sum::<usize>() as f64 / total as f64
    } else {
        0.0
    };
    let no_results_rate = if total > 0 { no_results as f64 / total as f64 * 100.0 } else { 0.0 };

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for l in logs {
        *counts.entry(l.term.as_str()).or_default() += 1;
    }
    let mut popular: Vec<PopularSearch> = counts
        .into_iter()
        .map(|(term, count)| PopularSearch { term: term.to_string(), count })
        .collect();
    popular.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.term.cmp(&b.term)));
    popular.truncate(10);

    SearchReport {
        total_searches: total,
        avg_results,
        no_results_count: no_results,
        no_results_rate,
        popular,
    }
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

pub async fn api_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "articles": state.catalog.articles.len(),
        "categories": state.catalog.categories.len(),
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn log(term: &str, hits: usize, minute: u32) -> SearchLog {
        SearchLog {
            term: term.to_string(),
            results_count: hits,
            created_at: chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(12, minute, 0)
                .unwrap(),
            ip_address: "127.0.0.1".to_string(),
        }
    }

    #[test]
    fn flag_parsing() {
        assert!(parse_flag(Some("true")));
        assert!(parse_flag(Some("TRUE")));
        assert!(parse_flag(Some("1")));
        assert!(!parse_flag(Some("false")));
        assert!(!parse_flag(Some("yes")));
        assert!(!parse_flag(None));
    }

    #[test]
    fn forwarded_header_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.7, 172.16.0.1"));
        assert_eq!(client_ip(&headers, &Extensions::new()), "10.0.0.7");
        assert_eq!(client_ip(&HeaderMap::new(), &Extensions::new()), "unknown");
    }

    #[test]
    fn report_aggregates() {
        let logs = vec![
            log("install", 2, 1),
            log("install", 2, 2),
            log("zzz", 0, 3),
            log("editor", 1, 4),
        ];
        let r = build_report(&logs);
        assert_eq!(r.total_searches, 4);
        assert_eq!(r.no_results_count, 1);
        assert!((r.avg_results - 1.25).abs() < 1e-9);
        assert!((r.no_results_rate - 25.0).abs() < 1e-9);
        assert_eq!(r.popular[0], PopularSearch { term: "install".into(), count: 2 });
        assert_eq!(r.popular.len(), 3);
    }

    #[test]
    fn empty_report() {
        let r = build_report(&[]);
        assert_eq!(r.total_searches, 0);
        assert_eq!(r.avg_results, 0.0);
        assert!(r.popular.is_empty());
    }
}
