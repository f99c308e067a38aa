//! kbsearch server: the reader site's search endpoint.
//!
//! Serves `GET /search?q=&log=` over an in-memory article catalog, records
//! explicitly submitted searches, and reports on them.
//!
//! # Modules
//!
//! - [`catalog`]: article/category catalog, TOML loading, substring search
//! - [`api`]: HTTP handlers
//! - [`types`]: shared state and search-log types

pub mod api;
pub mod catalog;
pub mod types;

use std::path::Path;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use api::*;
use catalog::{seed_catalog, Catalog, CatalogError};
use types::AppState;

/// Load the catalog at `path`, or the built-in seed when no path is given.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog, CatalogError> {
    let catalog = match path {
        Some(p) => {
            info!(path = %p.display(), "Loading catalog");
            Catalog::load(p)?
        }
        None => {
            info!("No catalog given, using built-in seed");
            seed_catalog()
        }
    };
    info!(
        categories = catalog.categories.len(),
        articles = catalog.articles.len(),
        "Catalog ready"
    );
    Ok(catalog)
}

/// All routes with the standard middleware stack.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(api_health))
        .route("/search", get(api_search))
        .route("/api/search-logs", get(api_search_logs))
        .route("/api/search-report", get(api_search_report))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
