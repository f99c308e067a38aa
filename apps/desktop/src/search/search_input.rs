//! Search input. Every edit goes to the session as a keystroke; the session
//! owns debouncing and validation.

use dioxus::prelude::*;
use kbsearch_core::PointerTarget;

use crate::state::*;

#[component]
pub fn SearchInput() -> Element {
    let link = use_context::<SessionLink>();
    let query = QUERY.read();
    let has_query = !query.trim().is_empty();

    let on_input = {
        let link = link.clone();
        move |e: Event<FormData>| {
            let value = e.value();
            *QUERY.write() = value.clone();
            link.keystroke(value);
        }
    };
    let on_submit = {
        let link = link.clone();
        move |e: Event<FormData>| {
            e.prevent_default();
            link.submit(QUERY.read().clone());
        }
    };
    let on_click = {
        let link = link.clone();
        move |e: Event<MouseData>| {
            e.stop_propagation();
            link.pointer(PointerTarget::Input);
        }
    };
    let on_clear = move |e: Event<MouseData>| {
        e.stop_propagation();
        *QUERY.write() = String::new();
        link.keystroke(String::new());
    };

    rsx! {
        form {
            class: if has_query { "search-field has-query" } else { "search-field" },
            onsubmit: on_submit,
            onclick: on_click,

            div {
                class: "search-input-row",

                svg {
                    class: "search-icon",
                    width: "16",
                    height: "16",
                    view_box: "0 0 24 24",
                    fill: "none",
                    stroke: "currentColor",
                    stroke_width: "2",
                    circle { cx: "11", cy: "11", r: "8" }
                    line { x1: "21", y1: "21", x2: "16.65", y2: "16.65" }
                }

                input {
                    class: "search-input",
                    r#type: "search",
                    name: "q",
                    placeholder: "Search articles...",
                    autocomplete: "off",
                    value: "{query}",
                    autofocus: true,
                    oninput: on_input,
                }

                if has_query {
                    button {
                        class: "search-clear",
                        r#type: "button",
                        onclick: on_clear,
                        "\u{00D7}"
                    }
                }
            }
        }
    }
}
