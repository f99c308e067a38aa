//! kbsearch Desktop: Dioxus search box over a kbsearch-core session.

use std::sync::{Arc, Mutex};

use dioxus::prelude::*;
use tracing::{error, info};

use kbsearch_core::{load_search_config, spawn_session, HttpTransport, SessionHandle};

mod app;
mod search;
mod state;

use app::App;

/// Pre-runtime storage, started before Dioxus launches, consumed on first render.
pub static INITIAL_SESSION: Mutex<Option<SessionHandle>> = Mutex::new(None);

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("kbsearch=info".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let cwd = std::env::current_dir().unwrap_or_else(|_| ".".into());
    let config = load_search_config(&cwd);

    let transport = match HttpTransport::new(&config.endpoint, config.request_timeout()) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Could not build HTTP client");
            std::process::exit(1);
        }
    };

    // The session and its requests run on their own runtime, outliving launch.
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "Could not start tokio runtime");
            std::process::exit(1);
        }
    };
    let session = {
        let _guard = runtime.enter();
        spawn_session(&config, Arc::new(transport))
    };
    info!(endpoint = %config.endpoint, debounce_ms = config.debounce_ms, "Search session started");
    if let Ok(mut slot) = INITIAL_SESSION.lock() {
        *slot = Some(session);
    }

    use dioxus::desktop::{Config, LogicalSize, WindowBuilder};

    LaunchBuilder::new()
        .with_cfg(
            Config::default()
                .with_menu(None)
                .with_background_color((250, 250, 250, 255))
                .with_window(
                    WindowBuilder::new()
                        .with_title("Knowledge Base")
                        .with_inner_size(LogicalSize::new(960.0, 720.0))
                        .with_min_inner_size(LogicalSize::new(480.0, 360.0))
                        .with_resizable(true),
                ),
        )
        .launch(App);

    drop(runtime);
}
