//! Search request transport.
//!
//! Provides a `Transport` trait with one real implementation, `HttpTransport`,
//! which issues `GET /search?q=..&log=..` against the reader site. Transports
//! never retry; every call resolves to results or a `TransportError`.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::TransportError;
use crate::types::{Query, SearchResult};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, query: &Query) -> Result<Vec<SearchResult>, TransportError>;
    fn name(&self) -> &str;
}

/// HTTP transport against a `/search` endpoint.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// `endpoint` is the site root, e.g. `http://127.0.0.1:8432`. A timeout of
    /// `None` leaves requests unbounded.
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(Self { client: builder.build()?, endpoint: endpoint.trim_end_matches('/').to_string() })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, query: &Query) -> Result<Vec<SearchResult>, TransportError> {
        let url = format!("{}/search", self.endpoint);
        let log = if query.should_log() { "true" } else { "false" };
        debug!(seq = query.seq(), q = query.text(), log, "GET /search");

        let resp = self.client.get(&url).query(&[("q", query.text()), ("log", log)]).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| TransportError::Decode(e.to_string()))
    }

    fn name(&self) -> &str {
        "http"
    }
}
