//! `.kbsearch.toml` loading.

use std::path::Path;
use std::time::Duration;

use tracing::{debug, warn};

use crate::scheduler::DEBOUNCE_MS;
use crate::validate::{QueryBounds, MAX_QUERY_LENGTH, MIN_QUERY_LENGTH};

pub const CONFIG_FILE: &str = ".kbsearch.toml";
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8432";
pub const ENDPOINT_ENV: &str = "KBSEARCH_ENDPOINT";

/// Known keys in `.kbsearch.toml` for config validation.
const KNOWN_CONFIG_KEYS: &[&str] = &[
    "endpoint",
    "debounce_ms",
    "min_query_len",
    "max_query_len",
    "request_timeout_ms",
    "abort_superseded",
];

/// Runtime configuration for a search session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Site root serving `/search`.
    pub endpoint: String,
    pub debounce_ms: u64,
    pub min_query_len: usize,
    pub max_query_len: usize,
    /// Per-request timeout. `None` = wait indefinitely.
    pub request_timeout_ms: Option<u64>,
    /// Abort in-flight requests once a newer query is dispatched.
    pub abort_superseded: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            debounce_ms: DEBOUNCE_MS,
            min_query_len: MIN_QUERY_LENGTH,
            max_query_len: MAX_QUERY_LENGTH,
            request_timeout_ms: None,
            abort_superseded: false,
        }
    }
}

impl SearchConfig {
    pub fn bounds(&self) -> QueryBounds {
        QueryBounds { min: self.min_query_len, max: self.max_query_len }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

/// Levenshtein distance counted in chars, for "did you mean" hints.
fn edit_distance(typed: &str, known: &str) -> usize {
    let known: Vec<char> = known.chars().collect();
    let mut row: Vec<usize> = (0..=known.len()).collect();
    for (i, t) in typed.chars().enumerate() {
        let mut diag = row[0];
        row[0] = i + 1;
        for (j, k) in known.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = (above + 1).min(row[j] + 1).min(diag + usize::from(t != *k));
            diag = above;
        }
    }
    row[known.len()]
}

/// Parse config text. Unknown keys and ill-typed values are warned about and
/// skipped; an unparsable document yields defaults.
pub fn parse_search_config(content: &str) -> SearchConfig {
    let mut config = SearchConfig::default();
    let table = match content.parse::<toml::Table>() {
        Ok(t) => t,
        Err(e) => {
            warn!(error = %e, "Failed to parse {CONFIG_FILE}");
            return config;
        }
    };

    for key in table.keys() {
        if KNOWN_CONFIG_KEYS.contains(&key.as_str()) {
            continue;
        }
        let suggestion = KNOWN_CONFIG_KEYS.iter().min_by_key(|k| edit_distance(key, k));
        match suggestion {
            Some(s) if edit_distance(key, s) <= 3 => warn!(
                key = key.as_str(),
                suggestion = *s,
                "Unknown key in {CONFIG_FILE}: did you mean '{s}'?"
            ),
            _ => warn!(
                key = key.as_str(),
                "Unknown key in {CONFIG_FILE} (known keys: {})",
                KNOWN_CONFIG_KEYS.join(", ")
            ),
        }
    }

    if let Some(v) = table.get("endpoint") {
        match v.as_str() {
            Some(s) => config.endpoint = s.to_string(),
            None => warn!(key = "endpoint", "Expected a string"),
        }
    }
    if let Some(n) = read_uint(&table, "debounce_ms") {
        config.debounce_ms = n;
    }
    if let Some(n) = read_uint(&table, "min_query_len") {
        config.min_query_len = n as usize;
    }
    if let Some(n) = read_uint(&table, "max_query_len") {
        config.max_query_len = n as usize;
    }
    if let Some(n) = read_uint(&table, "request_timeout_ms") {
        config.request_timeout_ms = (n > 0).then_some(n);
    }
    if let Some(v) = table.get("abort_superseded") {
        match v.as_bool() {
            Some(b) => config.abort_superseded = b,
            None => warn!(key = "abort_superseded", "Expected a boolean"),
        }
    }

    if config.min_query_len > config.max_query_len {
        warn!(
            min = config.min_query_len,
            max = config.max_query_len,
            "min_query_len exceeds max_query_len; using defaults for both"
        );
        config.min_query_len = MIN_QUERY_LENGTH;
        config.max_query_len = MAX_QUERY_LENGTH;
    }

    config
}

fn read_uint(table: &toml::Table, key: &str) -> Option<u64> {
    let v = table.get(key)?;
    match v.as_integer() {
        Some(n) if n >= 0 => Some(n as u64),
        _ => {
            warn!(key, "Expected a non-negative integer");
            None
        }
    }
}

/// Load `.kbsearch.toml` from `dir` (defaults if absent), then apply the
/// `KBSEARCH_ENDPOINT` environment override.
pub fn load_search_config(dir: &Path) -> SearchConfig {
    let path = dir.join(CONFIG_FILE);
    let mut config = if path.exists() {
        debug!(path = %path.display(), "Loading {CONFIG_FILE}");
        match std::fs::read_to_string(&path) {
            Ok(content) => parse_search_config(&content),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read {CONFIG_FILE}");
                SearchConfig::default()
            }
        }
    } else {
        SearchConfig::default()
    };

    if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
        if !endpoint.trim().is_empty() {
            config.endpoint = endpoint.trim().to_string();
        }
    }
    config
}
