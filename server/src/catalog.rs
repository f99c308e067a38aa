//! In-memory article catalog and the `/search` matching rule.
//!
//! Matching is a case-insensitive substring test against title or content,
//! first [`SEARCH_LIMIT`] hits by article id. No ranking.

use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

use chrono::NaiveDateTime;
use kbsearch_core::validate::MAX_QUERY_LENGTH;
use kbsearch_core::SearchResult;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Maximum hits returned per query.
pub const SEARCH_LIMIT: usize = 10;

/// Preview length in chars before the ellipsis.
pub const PREVIEW_CHARS: usize = 150;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("could not read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: i64 },

    #[error("article {article} refers to unknown category {category}")]
    UnknownCategory { article: i64, category: i64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    /// Rich-text HTML as produced by the editor.
    pub content: String,
    pub category_id: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(default)]
    pub views: u64,
}

/// TOML layout: `[[category]]` and `[[article]]` tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default, rename = "category")]
    pub categories: Vec<Category>,
    #[serde(default, rename = "article")]
    pub articles: Vec<Article>,
}

impl Catalog {
    /// Parse and validate catalog TOML.
    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        let mut catalog: Catalog = toml::from_str(content)?;
        catalog.validate()?;
        catalog.articles.sort_by_key(|a| a.id);
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let mut category_ids = HashSet::new();
        for c in &self.categories {
            if !category_ids.insert(c.id) {
                return Err(CatalogError::DuplicateId { kind: "category", id: c.id });
            }
        }
        let mut article_ids = HashSet::new();
        for a in &self.articles {
            if !article_ids.insert(a.id) {
                return Err(CatalogError::DuplicateId { kind: "article", id: a.id });
            }
            if !category_ids.contains(&a.category_id) {
                return Err(CatalogError::UnknownCategory { article: a.id, category: a.category_id });
            }
        }
        Ok(())
    }

    pub fn category_name(&self, id: i64) -> &str {
        self.categories.iter().find(|c| c.id == id).map(|c| c.name.as_str()).unwrap_or("")
    }

    /// Run a query. Empty or over-long queries match nothing.
    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        let query = query.trim();
        if query.is_empty() || query.chars().count() > MAX_QUERY_LENGTH {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        self.articles
            .iter()
            .filter(|a| {
                a.title.to_lowercase().contains(&needle) || a.content.to_lowercase().contains(&needle)
            })
            .take(SEARCH_LIMIT)
            .map(|a| SearchResult {
                id: a.id,
                title: Some(a.title.clone()),
                preview: Some(preview(&a.content)),
                category_name: Some(self.category_name(a.category_id).to_string()),
                updated_at: Some(a.updated_at.format("%Y-%m-%dT%H:%M:%S").to_string()),
            })
            .collect()
    }
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("static regex"))
}

fn space_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

/// Plain-text excerpt of rich-text content: tags stripped, whitespace
/// collapsed, cut at [`PREVIEW_CHARS`] with `...`.
pub fn preview(content: &str) -> String {
    let text = tag_re().replace_all(content, " ");
    let text = space_re().replace_all(&text, " ");
    let text = text.trim();
    if text.chars().count() <= PREVIEW_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(PREVIEW_CHARS).collect();
    format!("{}...", cut.trim_end())
}

/// Built-in catalog used when no `--catalog` file is given.
pub const SEED_CATALOG: &str = r#"
[[category]]
id = 1
name = "Getting Started"
description = "Introduction and basic concepts"

[[category]]
id = 2
name = "User Guide"
description = "Detailed user documentation"

[[category]]
id = 3
name = "API Reference"
description = "API documentation and examples"

[[category]]
id = 4
name = "Tutorials"
description = "Step-by-step tutorials and guides"

[[category]]
id = 5
name = "FAQs"
description = "Frequently asked questions"

[[article]]
id = 1
title = "Installing the knowledge base"
content = "<p>Download the latest release and run the <strong>installer</strong>. The setup wizard creates the database and a default admin account.</p>"
category_id = 1
created_at = "2024-01-02T09:00:00"
updated_at = "2024-01-05T10:00:00"

[[article]]
id = 2
title = "Organizing articles into categories"
content = "<p>Every article belongs to exactly one category. Categories can be reordered by dragging them in the admin panel.</p>"
category_id = 2
created_at = "2024-01-03T09:00:00"
updated_at = "2024-02-11T16:20:00"

[[article]]
id = 3
title = "Search endpoint"
content = "<p>Send <code>GET /search?q=term</code> to find articles whose title or content contains the term. Pass <code>log=true</code> to record the search.</p>"
category_id = 3
created_at = "2024-01-04T09:00:00"
updated_at = "2024-03-01T08:15:00"

[[article]]
id = 4
title = "Writing your first article"
content = "<h2>Create</h2><p>Open the editor, pick a category and start typing. Images can be pasted directly into the editor.</p>"
category_id = 4
created_at = "2024-01-05T09:00:00"
updated_at = "2024-03-18T12:00:00"

[[article]]
id = 5
title = "Why does search show no results?"
content = "<p>Queries shorter than two characters are ignored. Try fewer or different words, or browse the categories instead.</p>"
category_id = 5
created_at = "2024-01-06T09:00:00"
updated_at = "2024-04-02T14:45:00"
"#;

/// The built-in seed catalog.
pub fn seed_catalog() -> Catalog {
    Catalog::from_toml(SEED_CATALOG).expect("seed catalog is valid")
}
