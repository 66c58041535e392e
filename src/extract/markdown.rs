// src/extract/markdown.rs
// =============================================================================
// This module extracts links from Markdown documents (READMEs, docs pages
// served as text/markdown, ...).
//
// We use the `pulldown-cmark` crate which parses Markdown into a stream of
// events. A link shows up as Start(Link) -> Text -> End(Link); we remember the
// destination at the start and emit it at the end.
// =============================================================================

use pulldown_cmark::{Event, Parser, Tag};
use url::Url;

use super::resolve_url;

// Extracts all crawlable links from Markdown text
//
// Relative destinations ("docs/setup.md") are resolved against the document
// URL, so they can be crawled like any other page.
pub fn extract_markdown_links(markdown: &str, page_url: &Url) -> Vec<String> {
    let mut links = Vec::new();
    let mut current_link: Option<String> = None;

    for event in Parser::new(markdown) {
        match event {
            // In pulldown-cmark 0.9, Link is Tag::Link(link_type, dest_url, title)
            Event::Start(Tag::Link(_link_type, dest_url, _title)) => {
                current_link = resolve_url(page_url, &dest_url);
            }
            Event::End(Tag::Link(..)) => {
                if let Some(url) = current_link.take() {
                    links.push(url);
                }
            }
            _ => {}
        }
    }

    links
}
