//! kbsearch core: the incremental search pipeline behind the reader's
//! search box.
//!
//! Keystrokes are validated and debounced into [`Query`] values with strictly
//! increasing sequence numbers; a [`Transport`] sends each one; responses come
//! back in any order and the [`Reconciler`] lets through only those at least
//! as new as the one on display; the renderer turns accepted outcomes into
//! escaped panel data.
//!
//! # Modules
//!
//! - [`validate`]: query length bounds
//! - [`sanitize`]: escaping for untrusted text
//! - [`scheduler`]: debounce timer and sequence numbering
//! - [`transport`]: `Transport` trait and the HTTP implementation
//! - [`reconcile`]: stale-response rejection
//! - [`render`]: panel view construction and visibility
//! - [`visibility`]: outside-click dismissal
//! - [`session`]: the event loop tying the above together
//! - [`config`]: `.kbsearch.toml` loading
//! - [`types`] / [`error`]: shared data and error types

pub mod config;
pub mod error;
pub mod reconcile;
pub mod render;
pub mod sanitize;
pub mod scheduler;
pub mod session;
pub mod transport;
pub mod types;
pub mod validate;
pub mod visibility;

pub use config::{load_search_config, SearchConfig};
pub use error::{TransportError, ValidationRejected};
pub use reconcile::{DisplayState, Reconciler, Verdict};
pub use render::{render, PanelBody, PanelView, ResultItem};
pub use sanitize::{escape, unescape};
pub use scheduler::QueryScheduler;
pub use session::{spawn_session, SessionHandle, SessionReport, SessionStats};
pub use transport::{HttpTransport, Transport};
pub use types::{Completion, InputEvent, Outcome, Query, SearchResult, SeqNo};
pub use validate::is_eligible;
pub use visibility::PointerTarget;
