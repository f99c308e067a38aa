//! kbsearch CLI: drive the search pipeline from a terminal.
//!
//! `kbs search` sends one submitted query. `kbs live` treats each stdin line
//! as the new content of the search box and reprints the panel as it changes.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;

use kbsearch_core::render::render;
use kbsearch_core::{
    load_search_config, spawn_session, Completion, HttpTransport, PanelView, PointerTarget,
    QueryScheduler, SearchConfig,
};

/// kbsearch CLI: incremental knowledge-base search from the terminal.
#[derive(Parser)]
#[command(name = "kbs", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON instead of human-readable text
    #[arg(long, global = true)]
    json: bool,

    /// Site root serving /search (overrides .kbsearch.toml and KBSEARCH_ENDPOINT)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Directory holding .kbsearch.toml (default: current directory)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit one query (logged server-side) and print the results panel
    Search {
        /// Search query
        query: String,

        /// Print the panel markup instead of text
        #[arg(long)]
        html: bool,
    },
    /// Live search: each stdin line is the new search-box content.
    /// `:submit`, `:click-outside` and `:quit` are commands.
    Live {
        /// Debounce interval in milliseconds
        #[arg(long)]
        debounce_ms: Option<u64>,

        /// Abort in-flight requests superseded by a newer query
        #[arg(long)]
        abort_superseded: bool,
    },
    /// Print the effective configuration
    Config,
}

fn resolve_config(cli: &Cli) -> SearchConfig {
    let dir = cli
        .config_dir
        .clone()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    let mut config = load_search_config(&dir);
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint = endpoint.clone();
    }
    config
}

fn make_transport(config: &SearchConfig) -> HttpTransport {
    HttpTransport::new(&config.endpoint, config.request_timeout()).unwrap_or_else(|e| {
        error!(error = %e, "Could not build HTTP client");
        std::process::exit(1);
    })
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("kbsearch=warn".parse().unwrap()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = resolve_config(&cli);

    match cli.command {
        Commands::Search { ref query, html } => run_search(&config, query, html, cli.json).await,
        Commands::Live { debounce_ms, abort_superseded } => {
            if let Some(ms) = debounce_ms {
                config.debounce_ms = ms;
            }
            config.abort_superseded |= abort_superseded;
            run_live(&config, cli.json).await;
        }
        Commands::Config => {
            if cli.json {
                let output = serde_json::json!({
                    "endpoint": config.endpoint,
                    "debounce_ms": config.debounce_ms,
                    "min_query_len": config.min_query_len,
                    "max_query_len": config.max_query_len,
                    "request_timeout_ms": config.request_timeout_ms,
                    "abort_superseded": config.abort_superseded,
                });
                println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
            } else {
                println!("Endpoint:          {}", config.endpoint);
                println!("Debounce:          {}ms", config.debounce_ms);
                println!("Query length:      {}..={}", config.min_query_len, config.max_query_len);
                match config.request_timeout_ms {
                    Some(ms) => println!("Request timeout:   {ms}ms"),
                    None => println!("Request timeout:   none"),
                }
                println!("Abort superseded:  {}", config.abort_superseded);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// One-shot search
// ---------------------------------------------------------------------------

async fn run_search(config: &SearchConfig, raw: &str, html: bool, json: bool) {
    let mut scheduler = QueryScheduler::new(config.bounds(), config.debounce());
    let Some(query) = scheduler.on_submit(raw) else {
        let bounds = config.bounds();
        eprintln!("Query must be {}..={} characters after trimming", bounds.min, bounds.max);
        std::process::exit(1);
    };

    let transport = make_transport(config);
    let result = kbsearch_core::Transport::send(&transport, &query).await;

    if let Err(e) = &result {
        error!(error = %e, "Search failed");
    }
    let failed = result.is_err();

    if json {
        match &result {
            Ok(items) => println!("{}", serde_json::to_string_pretty(items).unwrap_or_default()),
            Err(e) => println!("{}", serde_json::json!({ "error": e.to_string() })),
        }
    } else {
        let body = render(&Completion { query, result }.into_outcome());
        if html {
            println!("{}", body.to_html());
        } else {
            println!("{}", body.to_text());
        }
    }

    if failed {
        std::process::exit(1);
    }
}

// ---------------------------------------------------------------------------
// Live search
// ---------------------------------------------------------------------------

fn print_view(view: &PanelView, json: bool) {
    if json {
        println!("{}", serde_json::to_string(view).unwrap_or_default());
        return;
    }
    match (&view.body, view.visible) {
        (Some(body), true) => {
            match view.seq {
                Some(seq) => println!("── #{seq} ──────────────────────────────"),
                None => println!("────────────────────────────────────"),
            }
            println!("{}", body.to_text());
        }
        _ => println!("(panel hidden)"),
    }
}

async fn run_live(config: &SearchConfig, json: bool) {
    let transport = Arc::new(make_transport(config));
    let session = spawn_session(config, transport);

    let mut rx = session.subscribe();
    let printer = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let view = rx.borrow_and_update().clone();
            print_view(&view, json);
        }
    });

    if !json {
        eprintln!("Type to search. Commands: :submit  :click-outside  :quit");
    }

    let mut current = String::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!(error = %e, "Could not read stdin");
                break;
            }
        };
        match line.trim_end() {
            ":quit" => break,
            ":submit" => {
                session.submit(current.clone());
            }
            ":click-outside" => {
                session.pointer(PointerTarget::Outside);
            }
            text => {
                current = text.to_string();
                session.keystroke(current.clone());
            }
        }
    }

    let report = session.close().await;
    let _ = printer.await;

    if json {
        eprintln!("{}", serde_json::to_string(&report.stats).unwrap_or_default());
    } else {
        let s = report.stats;
        eprintln!(
            "\n{} dispatched ({} logged), {} shown, {} stale, {} failed",
            s.dispatched, s.logged, s.accepted, s.stale, s.failures
        );
    }
}
