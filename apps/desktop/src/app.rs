//! Root application component: page backdrop with the search box on top.

use dioxus::prelude::*;
use kbsearch_core::PointerTarget;

use crate::search::SearchPanel;
use crate::state::*;
use crate::INITIAL_SESSION;

static APP_CSS: Asset = asset!("/assets/styles/app.css");

#[component]
pub fn App() -> Element {
    let link = use_context_provider(|| {
        SessionLink::new(INITIAL_SESSION.lock().ok().and_then(|mut slot| slot.take()))
    });

    // Mirror the session's panel stream into the PANEL signal.
    let source = link.clone();
    use_future(move || {
        let rx = source.handle().map(|h| h.subscribe());
        async move {
            let Some(mut rx) = rx else { return };
            while rx.changed().await.is_ok() {
                let view = rx.borrow_and_update().clone();
                *PANEL.write() = view;
            }
        }
    });

    rsx! {
        document::Stylesheet { href: APP_CSS }

        // Any click that reaches the backdrop landed outside input and panel.
        div {
            class: "page-backdrop",
            onclick: {
                let link = link.clone();
                move |_| link.pointer(PointerTarget::Outside)
            },

            header {
                class: "page-header",
                h1 { "Knowledge Base" }
                p { class: "page-subtitle", "Find answers in our help articles" }
            }

            SearchPanel {}

            StatusBar {}
        }
    }
}

/// Status line under the search box
#[component]
fn StatusBar() -> Element {
    let panel = PANEL.read();
    let label = match panel.seq {
        Some(seq) => format!("query #{seq}"),
        None => "ready".to_string(),
    };

    rsx! {
        div {
            class: "statusbar",
            span { class: "statusbar-seq", "{label}" }
            if !panel.visible {
                span { class: "statusbar-sep", "|" }
                span { class: "statusbar-hidden", "panel hidden" }
            }
        }
    }
}
