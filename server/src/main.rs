//! kbsearch binary: thin CLI shell over the [`kbsearch_server`] library crate.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use tracing::{error, info};

use kbsearch_server::types::AppState;
use kbsearch_server::{build_router, load_catalog};

// ---------------------------------------------------------------------------
// CLI definition (clap derive)
// ---------------------------------------------------------------------------

/// Reader-site search endpoint: article catalog, /search, search-log reports.
#[derive(Parser)]
#[command(name = "kbsearch", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Catalog TOML file (default: built-in seed catalog)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Bind to 0.0.0.0 instead of 127.0.0.1 (localhost)
    #[arg(long)]
    bind_all: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a catalog file and print its size
    Check {
        /// Catalog TOML file
        path: PathBuf,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Graceful shutdown signal
// ---------------------------------------------------------------------------

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    error!(error = %e, "Failed to register SIGTERM handler");
                    let _ = ctrl_c.await;
                    return;
                }
            };
        tokio::select! {
            _ = ctrl_c => info!("Received SIGINT, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
        info!("Received Ctrl+C, shutting down...");
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("kbsearch=info".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Some(command) = &cli.command {
        match command {
            Commands::Check { path } => match load_catalog(Some(path)) {
                Ok(catalog) => {
                    println!(
                        "{}: {} categories, {} articles",
                        path.display(),
                        catalog.categories.len(),
                        catalog.articles.len()
                    );
                    return;
                }
                Err(e) => {
                    error!(path = %path.display(), error = %e, "Invalid catalog");
                    std::process::exit(1);
                }
            },
            Commands::Completions { shell } => {
                clap_complete::generate(*shell, &mut Cli::command(), "kbsearch", &mut std::io::stdout());
                return;
            }
        }
    }

    let catalog = load_catalog(cli.catalog.as_deref()).unwrap_or_else(|e| {
        error!(error = %e, "Could not load catalog");
        std::process::exit(1);
    });
    let state = Arc::new(AppState::new(catalog));
    let app = build_router(state);

    // Bind address: 127.0.0.1 by default, --bind-all for 0.0.0.0
    let bind_addr = if cli.bind_all { "0.0.0.0" } else { "127.0.0.1" };

    let explicit_port: Option<u16> = std::env::var("PORT").ok().and_then(|p| p.parse().ok());

    let listener = if let Some(port) = explicit_port {
        tokio::net::TcpListener::bind(format!("{bind_addr}:{port}")).await.unwrap_or_else(|e| {
            error!(port = port, error = %e, "Could not bind to port");
            eprintln!("  PORT={port} was set explicitly. Choose a different port.");
            std::process::exit(1);
        })
    } else {
        // Auto-scan: try 8432..=8441
        const BASE: u16 = 8432;
        const RANGE: u16 = 10;
        let mut found = None;
        for port in BASE..BASE + RANGE {
            match tokio::net::TcpListener::bind(format!("{bind_addr}:{port}")).await {
                Ok(l) => {
                    found = Some(l);
                    break;
                }
                Err(_) => continue,
            }
        }
        found.unwrap_or_else(|| {
            error!(range_start = BASE, range_end = BASE + RANGE - 1, "No free port found");
            eprintln!("  Try: PORT=<port> kbsearch");
            std::process::exit(1);
        })
    };

    let port = match listener.local_addr() {
        Ok(addr) => addr.port(),
        Err(e) => {
            error!(error = %e, "Listener has no local address");
            std::process::exit(1);
        }
    };

    info!(port = port, "http://localhost:{port}");
    // Machine-readable line for scripts (not through tracing)
    eprintln!("KBSEARCH_PORT={port}");

    if let Err(e) = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
