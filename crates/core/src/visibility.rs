//! Outside-click dismissal of the results panel.

use serde::{Deserialize, Serialize};

/// Where a pointer interaction landed, as classified by the host UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerTarget {
    /// The search input or its form.
    Input,
    /// Inside the results panel.
    Panel,
    Outside,
}

/// True when the interaction should close the panel.
pub fn should_hide(target: PointerTarget) -> bool {
    matches!(target, PointerTarget::Outside)
}
