// src/fetch/http.rs
// =============================================================================
// This module downloads pages over HTTP with reqwest.
//
// Key functionality:
// - One shared client with a per-request timeout and a redirect limit
// - Non-success statuses become FetchError::Status
// - Bodies are read chunk by chunk and refused once they pass the size limit
// - reqwest errors are sorted into timeout / DNS / TLS / redirect / connect
// =============================================================================

use async_trait::async_trait;
use reqwest::{header, Client, Response};
use std::time::Duration;

use super::{FetchedPage, Fetcher};
use crate::error::FetchError;

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Default cap on a buffered response body (10 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_MAX_REDIRECTS: usize = 5;
const DEFAULT_USER_AGENT: &str = concat!("link-crawler/", env!("CARGO_PKG_VERSION"));

// Settings for building the HTTP client
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub timeout: Duration,
    pub max_redirects: usize,
    pub max_body_bytes: usize,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Fetcher backed by a reqwest client. Cheap to share between workers.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_body_bytes: usize,
}

impl HttpFetcher {
    pub fn new(settings: &FetchSettings) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.max_redirects))
            .user_agent(settings.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            max_body_bytes: settings.max_body_bytes,
        })
    }

    // Reads the body without ever holding more than max_body_bytes
    async fn read_body(&self, mut response: Response) -> Result<Vec<u8>, FetchError> {
        let limit = self.max_body_bytes;

        if let Some(length) = response.content_length() {
            if length > limit as u64 {
                return Err(FetchError::BodyTooLarge { limit });
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(categorize_error)? {
            if body.len() + chunk.len() > limit {
                return Err(FetchError::BodyTooLarge { limit });
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(categorize_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = self.read_body(response).await?;

        Ok(FetchedPage {
            url: url.to_string(),
            final_url,
            content_type,
            body,
        })
    }
}

// Sorts reqwest errors into the failure classes we report
fn categorize_error(error: reqwest::Error) -> FetchError {
    let error_string = error.to_string();

    if error.is_timeout() {
        FetchError::Timeout
    } else if error.is_redirect() {
        FetchError::TooManyRedirects
    } else if error.is_connect() {
        // Connection errors often mean DNS issues or host unreachable
        if error_string.contains("dns") {
            FetchError::Dns
        } else {
            FetchError::Connect(error_string)
        }
    } else if error_string.contains("certificate") || error_string.contains("ssl") {
        FetchError::Tls
    } else {
        FetchError::Request(error_string)
    }
}
