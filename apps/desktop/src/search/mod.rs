//! Search box: input field + results panel.

mod results_panel;
mod search_input;

use dioxus::prelude::*;
use results_panel::ResultsPanel;
use search_input::SearchInput;

/// Search box with its dropdown results panel.
#[component]
pub fn SearchPanel() -> Element {
    rsx! {
        div {
            class: "search-panel",
            SearchInput {}
            ResultsPanel {}
        }
    }
}
