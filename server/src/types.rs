use std::sync::RwLock;
use std::time::Instant;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::catalog::Catalog;

// ---------------------------------------------------------------------------
// Search log
// ---------------------------------------------------------------------------

/// One explicitly submitted search, as recorded for the report.
#[derive(Debug, Clone, Serialize)]
pub struct SearchLog {
    pub term: String,
    pub results_count: usize,
    pub created_at: NaiveDateTime,
    pub ip_address: String,
}

/// A term and how many times it was searched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopularSearch {
    pub term: String,
    pub count: usize,
}

/// Aggregate view over the search log.
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub total_searches: usize,
    pub avg_results: f64,
    pub no_results_count: usize,
    /// Percentage, 0–100.
    pub no_results_rate: f64,
    pub popular: Vec<PopularSearch>,
}

// ---------------------------------------------------------------------------
// Shared server state
// ---------------------------------------------------------------------------

/// State shared by all handlers.
pub struct AppState {
    pub catalog: Catalog,
    pub search_logs: RwLock<Vec<SearchLog>>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog, search_logs: RwLock::new(Vec::new()), start_time: Instant::now() }
    }
}
