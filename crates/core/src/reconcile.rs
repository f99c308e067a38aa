//! Response reconciliation: the only place that decides which of several
//! out-of-order responses gets to reach the panel.
//!
//! Requests are never cancelled, so responses can arrive in any order. The
//! reconciler accepts a response only if it is at least as new as the last
//! accepted one, which keeps the displayed sequence number monotonic.

use tracing::debug;

use crate::types::{Completion, Outcome, SeqNo};

/// Kind of content currently on the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shown {
    Results(usize),
    Empty,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayState {
    /// No response accepted yet.
    #[default]
    Idle,
    Displaying { seq: SeqNo, shown: Shown },
}

impl DisplayState {
    /// Sequence number on display, if any.
    pub fn seq(&self) -> Option<SeqNo> {
        match self {
            DisplayState::Idle => None,
            DisplayState::Displaying { seq, .. } => Some(*seq),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted { seq: SeqNo, outcome: Outcome },
    /// Older than what is already shown; dropped without effect.
    Stale { seq: SeqNo, last_accepted: SeqNo },
}

#[derive(Debug, Default)]
pub struct Reconciler {
    state: DisplayState,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DisplayState {
        self.state
    }

    /// Decide whether `completion` may replace what is displayed.
    pub fn reconcile(&mut self, completion: Completion) -> Verdict {
        let seq = completion.seq();
        if let Some(last_accepted) = self.state.seq() {
            if seq < last_accepted {
                debug!(seq, last_accepted, "Discarding stale response");
                return Verdict::Stale { seq, last_accepted };
            }
        }

        let outcome = completion.into_outcome();
        let shown = match &outcome {
            Outcome::Results(items) => Shown::Results(items.len()),
            Outcome::Empty(_) => Shown::Empty,
            Outcome::Error(_) => Shown::Error,
        };
        self.state = DisplayState::Displaying { seq, shown };
        Verdict::Accepted { seq, outcome }
    }
}
