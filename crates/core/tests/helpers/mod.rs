//! Test transport with scripted latency per query text.
//!
//! Every `send()` is recorded before the simulated delay starts, so tests can
//! assert on what was dispatched independently of what was displayed.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use kbsearch_core::{Query, SearchResult, SeqNo, Transport, TransportError};

#[derive(Clone)]
pub enum Reply {
    Hits(Vec<SearchResult>),
    Fail(u16),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub text: String,
    pub seq: SeqNo,
    pub log: bool,
}

#[derive(Default)]
pub struct ScriptedTransport {
    routes: HashMap<String, (Duration, Reply)>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `text` after `delay_ms` with `reply`. Unscripted queries get an
    /// immediate empty result list.
    pub fn route(mut self, text: &str, delay_ms: u64, reply: Reply) -> Self {
        self.routes.insert(text.to_string(), (Duration::from_millis(delay_ms), reply));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, query: &Query) -> Result<Vec<SearchResult>, TransportError> {
        self.calls.lock().unwrap().push(Call {
            text: query.text().to_string(),
            seq: query.seq(),
            log: query.should_log(),
        });
        let (delay, reply) = self
            .routes
            .get(query.text())
            .cloned()
            .unwrap_or((Duration::ZERO, Reply::Hits(vec![])));
        tokio::time::sleep(delay).await;
        match reply {
            Reply::Hits(items) => Ok(items),
            Reply::Fail(status) => Err(TransportError::Status(status)),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

pub fn hit(id: i64, title: &str) -> SearchResult {
    SearchResult {
        id,
        title: Some(title.to_string()),
        preview: Some(format!("About {title}")),
        category_name: Some("Tutorials".to_string()),
        updated_at: Some("2024-01-05T10:00:00".to_string()),
    }
}

/// Advance the paused clock.
pub async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
