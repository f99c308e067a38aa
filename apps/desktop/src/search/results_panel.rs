//! Results panel under the search input.

use dioxus::prelude::*;
use kbsearch_core::PointerTarget;

use crate::state::*;

#[component]
pub fn ResultsPanel() -> Element {
    let link = use_context::<SessionLink>();
    let panel = PANEL.read();

    let body = match (&panel.body, panel.visible) {
        (Some(body), true) => body,
        _ => {
            return rsx! {
                div { class: "search-results hidden" }
            };
        }
    };

    // Markup from the core renderer; every interpolated field is already escaped.
    let html = body.to_html();

    rsx! {
        div {
            class: "search-results",
            onclick: move |e: Event<MouseData>| {
                e.stop_propagation();
                link.pointer(PointerTarget::Panel);
            },
            div { dangerous_inner_html: "{html}" }
        }
    }
}
