//! Pure data-to-view construction for the results panel.
//!
//! [`render`] turns an [`Outcome`] into a [`PanelBody`] whose text fields are
//! all escaped. [`Panel`] holds the body plus visibility and is mutated only
//! by the session loop.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::sanitize::{escape, escape_opt, unescape};
use crate::types::{Outcome, SearchResult, SeqNo};

pub const NO_RESULTS_GUIDANCE: &str =
    "Try adjusting your search terms or browse our categories below";
pub const ERROR_NOTICE: &str = "An error occurred while searching. Please try again later.";

// ---------------------------------------------------------------------------
// View data
// ---------------------------------------------------------------------------

/// One rendered hit. Every field is already escaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultItem {
    pub href: String,
    pub title: String,
    pub preview: String,
    pub category: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PanelBody {
    /// A query is in flight and nothing newer has been accepted.
    Loading,
    Results { items: Vec<ResultItem> },
    NoResults { message: String, guidance: String },
    Error { message: String },
}

/// What a host should draw right now.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PanelView {
    pub visible: bool,
    pub body: Option<PanelBody>,
    /// Sequence number of the accepted response behind `body`, if any.
    pub seq: Option<SeqNo>,
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

pub fn render(outcome: &Outcome) -> PanelBody {
    match outcome {
        Outcome::Results(items) => PanelBody::Results { items: items.iter().map(render_item).collect() },
        Outcome::Empty(query) => PanelBody::NoResults {
            message: format!("No results found for \"{}\"", escape(query)),
            guidance: NO_RESULTS_GUIDANCE.to_string(),
        },
        Outcome::Error(_) => PanelBody::Error { message: ERROR_NOTICE.to_string() },
    }
}

fn render_item(r: &SearchResult) -> ResultItem {
    ResultItem {
        href: format!("/article/{}", r.id),
        title: escape_opt(r.title.as_deref()),
        preview: escape_opt(r.preview.as_deref()),
        category: escape_opt(r.category_name.as_deref()),
        date: r.updated_at.as_deref().map(format_date).unwrap_or_default(),
    }
}

/// Long-form date (`January 5, 2024`). Accepts naive ISO-8601 timestamps as
/// the server emits them, RFC 3339, or a bare date; anything else is shown
/// escaped as-is.
pub fn format_date(raw: &str) -> String {
    const LONG: &str = "%B %-d, %Y";
    let raw = raw.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format(LONG).to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(LONG).to_string();
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.format(LONG).to_string();
    }
    escape(raw)
}

impl PanelBody {
    /// List-group markup as the reader site embeds it.
    pub fn to_html(&self) -> String {
        match self {
            PanelBody::Loading => concat!(
                r#"<div class="text-center"><div class="spinner-border text-primary" role="status">"#,
                r#"<span class="visually-hidden">Loading...</span></div></div>"#
            )
            .to_string(),
            PanelBody::Results { items } => {
                let mut html = String::new();
                for item in items {
                    html.push_str(&format!(
                        concat!(
                            r#"<a class="list-group-item list-group-item-action" href="{href}">"#,
                            r#"<div class="d-flex w-100 justify-content-between">"#,
                            r#"<div class="search-result-content">"#,
                            r#"<h5 class="mb-1">{title}</h5>"#,
                            r#"<p class="mb-1 text-muted">{preview}</p>"#,
                            r#"<small class="category-tag">{category}</small>"#,
                            r#"</div><small class="text-muted text-end">{date}</small></div></a>"#
                        ),
                        href = item.href,
                        title = item.title,
                        preview = item.preview,
                        category = item.category,
                        date = item.date,
                    ));
                }
                html
            }
            PanelBody::NoResults { message, guidance } => format!(
                r#"<div class="text-center p-4"><p class="mt-3">{message}</p><p class="text-muted">{guidance}</p></div>"#
            ),
            PanelBody::Error { message } => {
                format!(r#"<div class="alert alert-danger" role="alert">{message}</div>"#)
            }
        }
    }

    /// Plain-text rendering for terminals. Entities are decoded back to the
    /// characters they stand for.
    pub fn to_text(&self) -> String {
        match self {
            PanelBody::Loading => "Searching...".to_string(),
            PanelBody::Results { items } => items
                .iter()
                .map(|i| {
                    format!(
                        "{:<50} {:>20}\n  [{}] {}",
                        unescape(&i.title),
                        unescape(&i.date),
                        unescape(&i.category),
                        unescape(&i.preview)
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"),
            PanelBody::NoResults { message, guidance } => {
                format!("{}\n{}", unescape(message), unescape(guidance))
            }
            PanelBody::Error { message } => format!("! {}", unescape(message)),
        }
    }
}

// ---------------------------------------------------------------------------
// Panel state
// ---------------------------------------------------------------------------

/// Panel contents plus visibility.
///
/// Hiding records the last dispatched sequence number; responses to queries
/// dispatched up to that point still update the body but do not bring the
/// panel back. Only a newer dispatch or its response does.
#[derive(Debug, Default)]
pub struct Panel {
    view: PanelView,
    hidden_through: SeqNo,
}

impl Panel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &PanelView {
        &self.view
    }

    /// A query was dispatched: show the loading state.
    pub fn on_dispatch(&mut self, seq: SeqNo) {
        self.view.body = Some(PanelBody::Loading);
        if seq > self.hidden_through {
            self.view.visible = true;
        }
    }

    /// An accepted response replaces the body.
    pub fn on_accepted(&mut self, seq: SeqNo, outcome: &Outcome) {
        self.view.body = Some(render(outcome));
        self.view.seq = Some(seq);
        if seq > self.hidden_through {
            self.view.visible = true;
        }
    }

    /// Withdrawal or outside click. `last_dispatched` is the newest sequence
    /// number handed to the transport so far.
    pub fn hide(&mut self, last_dispatched: SeqNo) {
        self.view.visible = false;
        self.hidden_through = self.hidden_through.max(last_dispatched);
    }
}
