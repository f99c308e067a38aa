use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::visibility::PointerTarget;

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Per-session dispatch sequence number. The first dispatched query gets 1.
pub type SeqNo = u64;

/// A query as it leaves the scheduler. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
    seq: SeqNo,
    should_log: bool,
}

impl Query {
    pub(crate) fn new(text: impl Into<String>, seq: SeqNo, should_log: bool) -> Self {
        Self { text: text.into(), seq, should_log }
    }

    /// Trimmed user input.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn seq(&self) -> SeqNo {
        self.seq
    }

    /// True only for explicit submissions; live-typing queries are never logged.
    pub fn should_log(&self) -> bool {
        self.should_log
    }
}

// ---------------------------------------------------------------------------
// Server data
// ---------------------------------------------------------------------------

/// One article hit as returned by `GET /search`. Untrusted until escaped.
///
/// Text fields may be missing or `null` on the wire; either renders as empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub preview: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

// ---------------------------------------------------------------------------
// Pipeline messages
// ---------------------------------------------------------------------------

/// A finished transport call, tagged with the query that produced it.
#[derive(Debug)]
pub struct Completion {
    pub query: Query,
    pub result: Result<Vec<SearchResult>, TransportError>,
}

impl Completion {
    pub fn seq(&self) -> SeqNo {
        self.query.seq()
    }

    /// Fold the transport result into the renderer's outcome vocabulary.
    pub fn into_outcome(self) -> Outcome {
        match self.result {
            Ok(items) if items.is_empty() => Outcome::Empty(self.query.text),
            Ok(items) => Outcome::Results(items),
            Err(e) => Outcome::Error(e.to_string()),
        }
    }
}

/// What the panel should show for an accepted response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Results(Vec<SearchResult>),
    /// No hits; carries the original query text for the notice.
    Empty(String),
    /// Transport failure; the message is for logs, never shown verbatim.
    Error(String),
}

/// Events fed into a search session by its host UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// The search box now contains this text.
    Keystroke(String),
    /// The search form was submitted with this text.
    Submit(String),
    Pointer(PointerTarget),
}
