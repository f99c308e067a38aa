//! Debounce and dispatch decisions for the search box.
//!
//! The scheduler is a plain state machine: the caller passes the current
//! instant in and asks for the deadline back, so the session loop owns the
//! actual timer and tests can drive it without a runtime.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::types::{Query, SeqNo};
use crate::validate::QueryBounds;

/// Idle interval before a typed query is sent.
pub const DEBOUNCE_MS: u64 = 300;

/// What a keystroke did to the pending dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeystrokeAction {
    /// Input fell out of bounds; any pending dispatch was dropped and the
    /// panel should be hidden.
    Withdrawn,
    /// A dispatch is now pending for this deadline.
    Scheduled(Instant),
}

#[derive(Debug)]
struct Pending {
    text: String,
    deadline: Instant,
}

#[derive(Debug)]
pub struct QueryScheduler {
    bounds: QueryBounds,
    debounce: Duration,
    pending: Option<Pending>,
    last_seq: SeqNo,
}

impl Default for QueryScheduler {
    fn default() -> Self {
        Self::new(QueryBounds::default(), Duration::from_millis(DEBOUNCE_MS))
    }
}

impl QueryScheduler {
    pub fn new(bounds: QueryBounds, debounce: Duration) -> Self {
        Self { bounds, debounce, pending: None, last_seq: 0 }
    }

    /// The search box changed. Any earlier pending dispatch is superseded.
    pub fn on_keystroke(&mut self, raw: &str, now: Instant) -> KeystrokeAction {
        self.pending = None;
        match self.bounds.check(Some(raw)) {
            Ok(text) => {
                let deadline = now + self.debounce;
                self.pending = Some(Pending { text: text.to_string(), deadline });
                KeystrokeAction::Scheduled(deadline)
            }
            Err(reason) => {
                debug!(%reason, "Keystroke withdrew query");
                KeystrokeAction::Withdrawn
            }
        }
    }

    /// Explicit submission: dispatch now, flagged for logging. Clears any
    /// pending debounced dispatch, which the submitted query supersedes.
    pub fn on_submit(&mut self, raw: &str) -> Option<Query> {
        match self.bounds.check(Some(raw)) {
            Ok(text) => {
                let text = text.to_string();
                self.pending = None;
                Some(self.dispatch(text, true))
            }
            Err(reason) => {
                debug!(%reason, "Submit rejected");
                None
            }
        }
    }

    /// When the pending dispatch is due, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Dispatch the pending query if its deadline has passed.
    pub fn fire(&mut self, now: Instant) -> Option<Query> {
        if !self.pending.as_ref().is_some_and(|p| p.deadline <= now) {
            return None;
        }
        let pending = self.pending.take()?;
        Some(self.dispatch(pending.text, false))
    }

    /// Sequence number of the most recent dispatch, 0 before the first one.
    pub fn last_dispatched(&self) -> SeqNo {
        self.last_seq
    }

    pub fn bounds(&self) -> QueryBounds {
        self.bounds
    }

    fn dispatch(&mut self, text: String, should_log: bool) -> Query {
        self.last_seq += 1;
        Query::new(text, self.last_seq, should_log)
    }
}
