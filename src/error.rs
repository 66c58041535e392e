// src/error.rs
// =============================================================================
// Error types shared by the crawl core and its collaborators.
//
// Per-item failures (FetchError, ParseError) never leave the worker that hit
// them: they are classified with FailureKind, logged and recorded in the
// crawl report. Only TerminationError and an invalid seed escape to the caller
// of Crawler::run as a CrawlError.
// =============================================================================

use serde::Serialize;
use thiserror::Error;

// Coarse classification used in logs and in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Network failure, timeout or non-success status
    Fetch,
    /// The document body could not be parsed for links
    Parse,
    /// The response would not fit into the configured body buffer
    Allocation,
}

/// Errors returned by a [`crate::fetch::Fetcher`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Request timed out
    #[error("request timed out")]
    Timeout,
    /// Could not resolve hostname
    #[error("could not resolve hostname")]
    Dns,
    /// SSL/TLS certificate error
    #[error("TLS certificate error")]
    Tls,
    /// Redirect loop or redirect limit exceeded
    #[error("too many redirects")]
    TooManyRedirects,
    /// Connection refused, reset or unreachable host
    #[error("connection failed: {0}")]
    Connect(String),
    /// The server answered with a non-success status
    #[error("HTTP {0}")]
    Status(u16),
    /// The body is larger than the fetcher is allowed to buffer
    #[error("response body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },
    /// Any other request failure
    #[error("{0}")]
    Request(String),
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::BodyTooLarge { .. } => FailureKind::Allocation,
            _ => FailureKind::Fetch,
        }
    }
}

/// Errors returned by a [`crate::extract::LinkExtractor`].
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("document is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("invalid base URL '{url}': {source}")]
    InvalidBase {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl ParseError {
    pub fn kind(&self) -> FailureKind {
        FailureKind::Parse
    }
}

// Broken bookkeeping in the frontier. Seeing one of these means the crawl can
// no longer tell when it is finished, so it is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TerminationError {
    #[error("pending counter went below zero")]
    PendingUnderflow,
}

/// Errors that abort a whole crawl.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid seed URL '{url}': {reason}")]
    InvalidSeed { url: String, reason: &'static str },
    #[error("termination invariant violated: {0}")]
    Invariant(#[from] TerminationError),
}
