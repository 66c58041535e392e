// src/extract/html.rs
// =============================================================================
// This module extracts links from HTML pages.
//
// We use the `scraper` crate to parse the HTML into a tree (html5ever does the
// actual parsing), then walk that tree ourselves with an explicit stack
// instead of recursing. Deeply nested or hostile documents therefore cannot
// grow the call stack.
//
// Links come back in document order. A <base href> seen before a link
// changes what that link is resolved against, like a browser does.
// =============================================================================

use scraper::{Html, Node};
use url::Url;

use super::resolve_url;

// Extracts all crawlable links from HTML content
//
// Parameters:
//   html: the HTML content to parse
//   page_url: the URL of the page (for resolving relative links)
//
// Returns: absolute http(s) URLs, in the order they appear
pub fn extract_html_links(html: &str, page_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut base = page_url.clone();
    let mut base_seen = false;
    let mut links = Vec::new();

    let mut stack = vec![document.tree.root()];
    while let Some(node) = stack.pop() {
        if let Node::Element(element) = node.value() {
            match element.name() {
                "a" | "area" => {
                    if let Some(link) = element.attr("href").and_then(|href| resolve_url(&base, href)) {
                        links.push(link);
                    }
                }
                "base" if !base_seen => {
                    if let Some(joined) = element.attr("href").and_then(|href| base.join(href).ok()) {
                        base = joined;
                        base_seen = true;
                    }
                }
                _ => {}
            }
        }

        // Children go on in reverse so the first child is visited next
        stack.extend(node.children().rev());
    }

    links
}
