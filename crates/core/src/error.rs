//! Error types for the search pipeline.
//!
//! Nothing here is fatal to a session: a rejected query is silently dropped and
//! a transport failure becomes an ordinary outcome that the reconciler renders.

/// Why a raw query was not eligible for dispatch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationRejected {
    /// No input at all (the null / non-string case).
    #[error("no query text")]
    Missing,

    /// Nothing left after trimming whitespace.
    #[error("query is empty")]
    Empty,

    #[error("query too short: {len} < {min}")]
    TooShort { len: usize, min: usize },

    #[error("query too long: {len} > {max}")]
    TooLong { len: usize, max: usize },
}

/// Failure of a single search request. Never retried.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection, DNS, timeout or other client-side failure.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("server returned HTTP {0}")]
    Status(u16),

    /// The body was not a JSON array of search results.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl TransportError {
    /// Short machine-friendly tag, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::Request(_) => "request",
            TransportError::Status(_) => "status",
            TransportError::Decode(_) => "decode",
        }
    }
}
