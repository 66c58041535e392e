// src/fetch/mod.rs
// =============================================================================
// This module defines how pages are downloaded.
//
// Submodules:
// - http: the reqwest-backed fetcher used by the binary
//
// The crawl core only talks to the Fetcher trait, so tests can swap in an
// in-memory site and the worker never knows the difference.
// =============================================================================

mod http;

use async_trait::async_trait;

use crate::error::FetchError;

pub use http::{FetchSettings, HttpFetcher, DEFAULT_MAX_BODY_BYTES, DEFAULT_TIMEOUT_SECS};

// A successfully downloaded document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// The URL that was requested
    pub url: String,
    /// The URL the response actually came from (after redirects)
    pub final_url: String,
    /// Value of the Content-Type header, if the server sent one
    pub content_type: Option<String>,
    /// Raw response body
    pub body: Vec<u8>,
}

impl FetchedPage {
    // Builds a page that was served from the URL it was requested with
    pub fn new(url: impl Into<String>, content_type: Option<&str>, body: impl Into<Vec<u8>>) -> Self {
        let url = url.into();
        Self {
            final_url: url.clone(),
            url,
            content_type: content_type.map(str::to_string),
            body: body.into(),
        }
    }

    /// The media type without parameters, lowercased ("text/html; charset=utf-8" -> "text/html").
    pub fn media_type(&self) -> Option<String> {
        self.content_type.as_deref().map(|value| {
            value
                .split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
        })
    }
}

/// Downloads one URL. Implementations own their own timeouts.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}
