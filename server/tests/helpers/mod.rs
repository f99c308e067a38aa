//! Test harness for the HTTP API.
//!
//! Builds the router over the seed catalog (or a given one) and drives it
//! in-process with `oneshot`, or binds it to an ephemeral port for tests that
//! need a real socket.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use kbsearch_server::catalog::{seed_catalog, Catalog};
use kbsearch_server::types::AppState;
use serde_json::Value;
use tower::ServiceExt;

pub struct TestHarness {
    pub state: Arc<AppState>,
    router: Router,
}

impl TestHarness {
    pub fn seeded() -> Self {
        Self::with_catalog(seed_catalog())
    }

    pub fn with_catalog(catalog: Catalog) -> Self {
        let state = Arc::new(AppState::new(catalog));
        let router = kbsearch_server::build_router(Arc::clone(&state));
        TestHarness { state, router }
    }

    /// GET `uri` with optional extra headers; returns status and JSON body.
    pub async fn get_with(&self, uri: &str, headers: &[(&str, &str)]) -> (StatusCode, Value) {
        let mut req = Request::get(uri);
        for (k, v) in headers {
            req = req.header(*k, *v);
        }
        let response = self
            .router
            .clone()
            .oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.get_with(uri, &[]).await
    }

    pub fn logged_terms(&self) -> Vec<String> {
        self.state.search_logs.read().unwrap().iter().map(|l| l.term.clone()).collect()
    }
}

/// Serve the router on 127.0.0.1 with an OS-assigned port; returns the base URL.
pub async fn spawn_server(state: Arc<AppState>) -> String {
    serve_router(kbsearch_server::build_router(state)).await
}

/// Serve an arbitrary router the same way, for stand-in backends.
pub async fn serve_router(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .unwrap();
    });
    format!("http://{addr}")
}
