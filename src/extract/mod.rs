// src/extract/mod.rs
// =============================================================================
// This module turns a fetched document into the links it points to.
//
// Submodules:
// - html: Extracts <a href> links from HTML pages
// - markdown: Extracts links from Markdown documents
//
// DocumentExtractor picks one of them from the response's Content-Type (or
// the URL's extension when the server says text/plain) and returns absolute
// http(s) URLs in document order. Anything that is not a document yields no
// links and no error.
// =============================================================================

mod html;
mod markdown;

use url::Url;

use crate::error::ParseError;
use crate::fetch::FetchedPage;

pub use html::extract_html_links;
pub use markdown::extract_markdown_links;

/// Pulls candidate URLs out of a fetched page, in document order.
pub trait LinkExtractor: Send + Sync {
    fn extract_links(&self, page: &FetchedPage) -> Result<Vec<String>, ParseError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentFormat {
    Html,
    Markdown,
}

// The extractor used by the binary
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentExtractor;

impl DocumentExtractor {
    fn detect(page: &FetchedPage) -> Option<DocumentFormat> {
        match page.media_type().as_deref() {
            Some("text/html") | Some("application/xhtml+xml") => Some(DocumentFormat::Html),
            Some("text/markdown") | Some("text/x-markdown") => Some(DocumentFormat::Markdown),
            Some("text/plain") if looks_like_markdown(&page.final_url) => {
                Some(DocumentFormat::Markdown)
            }
            // Servers that omit Content-Type usually serve HTML
            None => Some(DocumentFormat::Html),
            Some(_) => None,
        }
    }
}

impl LinkExtractor for DocumentExtractor {
    fn extract_links(&self, page: &FetchedPage) -> Result<Vec<String>, ParseError> {
        let Some(format) = Self::detect(page) else {
            tracing::debug!(url = %page.url, content_type = ?page.content_type, "Not a document, no links extracted");
            return Ok(Vec::new());
        };

        let text = std::str::from_utf8(&page.body)?;
        let base = Url::parse(&page.final_url).map_err(|source| ParseError::InvalidBase {
            url: page.final_url.clone(),
            source,
        })?;

        let links = match format {
            DocumentFormat::Html => extract_html_links(text, &base),
            DocumentFormat::Markdown => extract_markdown_links(text, &base),
        };
        Ok(links)
    }
}

fn looks_like_markdown(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    path.ends_with(".md") || path.ends_with(".markdown")
}

// Resolves a possibly-relative href against the page URL
//
// Returns None for in-page anchors, non-web schemes and anything that does
// not resolve to an http(s) URL.
pub(crate) fn resolve_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
        || href.starts_with("data:")
    {
        return None;
    }

    let resolved = base.join(href).ok()?;
    if is_crawlable_link(&resolved) {
        Some(resolved.to_string())
    } else {
        None
    }
}

fn is_crawlable_link(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}
