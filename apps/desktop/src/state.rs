//! Global application state using Dioxus signals.

use std::rc::Rc;

use dioxus::prelude::*;
use kbsearch_core::{PanelView, PointerTarget, SessionHandle};

/// Shared handle to the search session, provided as context by [`crate::app::App`].
#[derive(Clone)]
pub struct SessionLink(Option<Rc<SessionHandle>>);

impl SessionLink {
    pub fn new(handle: Option<SessionHandle>) -> Self {
        Self(handle.map(Rc::new))
    }

    pub fn handle(&self) -> Option<&SessionHandle> {
        self.0.as_deref()
    }

    pub fn keystroke(&self, raw: String) {
        if let Some(h) = self.handle() {
            h.keystroke(raw);
        }
    }

    pub fn submit(&self, raw: String) {
        if let Some(h) = self.handle() {
            h.submit(raw);
        }
    }

    pub fn pointer(&self, target: PointerTarget) {
        if let Some(h) = self.handle() {
            h.pointer(target);
        }
    }
}

// ---------------------------------------------------------------------------
// Global signals
// ---------------------------------------------------------------------------

/// Current content of the search box
pub static QUERY: GlobalSignal<String> = Signal::global(String::new);

/// Latest panel published by the session
pub static PANEL: GlobalSignal<PanelView> = Signal::global(PanelView::default);
