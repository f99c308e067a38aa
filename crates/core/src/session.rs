//! A running search session: one task that owns the scheduler, the
//! reconciler and the panel, and reacts to input events, the debounce
//! deadline and transport completions in a single `select!` loop.
//!
//! All state changes happen inside that loop, so no locking is involved.
//! Transport calls run as separate tasks and report back over a channel with
//! their query attached; the reconciler sees each one exactly once.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::SearchConfig;
use crate::reconcile::{DisplayState, Reconciler, Verdict};
use crate::render::{Panel, PanelView};
use crate::scheduler::{KeystrokeAction, QueryScheduler};
use crate::transport::Transport;
use crate::types::{Completion, InputEvent, Query, SeqNo};
use crate::visibility::{should_hide, PointerTarget};

/// Counters kept for the life of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub dispatched: u64,
    /// Dispatches flagged for server-side logging (explicit submits).
    pub logged: u64,
    pub accepted: u64,
    pub stale: u64,
    pub failures: u64,
    pub withdrawn: u64,
    pub aborted: u64,
}

/// Final state returned by [`SessionHandle::close`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    pub view: PanelView,
    pub stats: SessionStats,
    pub last_dispatched: SeqNo,
}

/// Host-side handle to a session task.
pub struct SessionHandle {
    events: mpsc::UnboundedSender<InputEvent>,
    view: watch::Receiver<PanelView>,
    task: JoinHandle<SessionReport>,
}

impl SessionHandle {
    /// Queue an input event. Returns false once the session has ended.
    pub fn send(&self, event: InputEvent) -> bool {
        self.events.send(event).is_ok()
    }

    pub fn keystroke(&self, raw: impl Into<String>) -> bool {
        self.send(InputEvent::Keystroke(raw.into()))
    }

    pub fn submit(&self, raw: impl Into<String>) -> bool {
        self.send(InputEvent::Submit(raw.into()))
    }

    pub fn pointer(&self, target: PointerTarget) -> bool {
        self.send(InputEvent::Pointer(target))
    }

    /// Snapshot of what the panel currently shows.
    pub fn view(&self) -> PanelView {
        self.view.borrow().clone()
    }

    /// Receiver notified whenever the panel changes.
    pub fn subscribe(&self) -> watch::Receiver<PanelView> {
        self.view.clone()
    }

    /// Stop accepting input and wait for the session task to finish.
    /// Responses still in flight are not waited for.
    pub async fn close(self) -> SessionReport {
        drop(self.events);
        match self.task.await {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "Search session task failed");
                SessionReport { view: self.view.borrow().clone(), ..Default::default() }
            }
        }
    }
}

/// Start a session on the current tokio runtime.
pub fn spawn_session(config: &SearchConfig, transport: Arc<dyn Transport>) -> SessionHandle {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (completions_tx, completions_rx) = mpsc::unbounded_channel();
    let (view_tx, view_rx) = watch::channel(PanelView::default());

    let session = Session {
        scheduler: QueryScheduler::new(config.bounds(), config.debounce()),
        reconciler: Reconciler::new(),
        panel: Panel::new(),
        transport,
        completions: completions_tx,
        abort_superseded: config.abort_superseded,
        in_flight: Vec::new(),
        stats: SessionStats::default(),
        view: view_tx,
    };
    let task = tokio::spawn(session.run(events_rx, completions_rx));

    SessionHandle { events: events_tx, view: view_rx, task }
}

struct Session {
    scheduler: QueryScheduler,
    reconciler: Reconciler,
    panel: Panel,
    transport: Arc<dyn Transport>,
    completions: mpsc::UnboundedSender<Completion>,
    abort_superseded: bool,
    /// Only tracked when `abort_superseded` is set.
    in_flight: Vec<(SeqNo, AbortHandle)>,
    stats: SessionStats,
    view: watch::Sender<PanelView>,
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(d) => tokio::time::sleep_until(d).await,
        None => std::future::pending().await,
    }
}

impl Session {
    async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<InputEvent>,
        mut completions: mpsc::UnboundedReceiver<Completion>,
    ) -> SessionReport {
        info!(
            transport = self.transport.name(),
            abort_superseded = self.abort_superseded,
            "Search session started"
        );

        loop {
            let deadline = self.scheduler.deadline();
            tokio::select! {
                biased;
                event = events.recv() => match event {
                    Some(event) => self.on_event(event),
                    None => break,
                },
                _ = wait_until(deadline) => self.on_deadline(),
                Some(completion) = completions.recv() => self.on_completion(completion),
            }
            self.publish();
        }

        for (_, handle) in self.in_flight.drain(..) {
            handle.abort();
        }
        let stats = self.stats;
        info!(
            dispatched = stats.dispatched,
            accepted = stats.accepted,
            stale = stats.stale,
            failures = stats.failures,
            "Search session ended"
        );
        SessionReport {
            view: self.panel.view().clone(),
            stats,
            last_dispatched: self.scheduler.last_dispatched(),
        }
    }

    fn on_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::Keystroke(raw) => {
                match self.scheduler.on_keystroke(&raw, Instant::now()) {
                    KeystrokeAction::Scheduled(_) => {}
                    KeystrokeAction::Withdrawn => {
                        self.stats.withdrawn += 1;
                        self.panel.hide(self.scheduler.last_dispatched());
                    }
                }
            }
            InputEvent::Submit(raw) => {
                if let Some(query) = self.scheduler.on_submit(&raw) {
                    self.dispatch(query);
                }
            }
            InputEvent::Pointer(target) => {
                if should_hide(target) {
                    debug!("Pointer outside search, hiding panel");
                    self.panel.hide(self.scheduler.last_dispatched());
                }
            }
        }
    }

    fn on_deadline(&mut self) {
        if let Some(query) = self.scheduler.fire(Instant::now()) {
            self.dispatch(query);
        }
    }

    fn dispatch(&mut self, query: Query) {
        let seq = query.seq();
        self.stats.dispatched += 1;
        if query.should_log() {
            self.stats.logged += 1;
        }
        debug!(seq, q = query.text(), log = query.should_log(), "Dispatching query");

        if self.abort_superseded {
            for (old, handle) in self.in_flight.drain(..) {
                handle.abort();
                self.stats.aborted += 1;
                debug!(seq = old, superseded_by = seq, "Aborted in-flight request");
            }
        }

        self.panel.on_dispatch(seq);

        let transport = Arc::clone(&self.transport);
        let tx = self.completions.clone();
        let handle = tokio::spawn(async move {
            let result = transport.send(&query).await;
            // the session may already be gone
            let _ = tx.send(Completion { query, result });
        });
        if self.abort_superseded {
            self.in_flight.push((seq, handle.abort_handle()));
        }
    }

    fn on_completion(&mut self, completion: Completion) {
        let seq = completion.seq();
        self.in_flight.retain(|(s, _)| *s != seq);
        if let Err(e) = &completion.result {
            self.stats.failures += 1;
            warn!(seq, kind = e.kind(), error = %e, "Search request failed");
        }

        match self.reconciler.reconcile(completion) {
            Verdict::Accepted { seq, outcome } => {
                self.stats.accepted += 1;
                self.panel.on_accepted(seq, &outcome);
            }
            Verdict::Stale { .. } => self.stats.stale += 1,
        }
        debug_assert!(matches!(self.reconciler.state(), DisplayState::Displaying { .. }));
    }

    fn publish(&self) {
        let current = self.panel.view();
        self.view.send_if_modified(|v| {
            if v == current {
                false
            } else {
                *v = current.clone();
                true
            }
        });
    }
}
