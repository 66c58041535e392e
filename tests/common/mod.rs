//! Shared helpers for integration tests: an in-memory site that serves HTML
//! pages built from a link graph and counts every fetch.

#![allow(dead_code)]

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use link_crawler::{
    CrawlConfig, CrawlReport, Crawler, DocumentExtractor, FetchError, FetchedPage, Fetcher,
};

pub const HOST: &str = "https://site.test";

/// Absolute URL for a short page name ("S" -> "https://site.test/S").
pub fn url(name: &str) -> String {
    format!("{HOST}/{name}")
}

pub struct GraphSite {
    links: HashMap<String, Vec<String>>,
    failing: HashMap<String, FetchError>,
    raw: HashMap<String, Vec<u8>>,
    delay: Duration,
    fetches: Mutex<HashMap<String, usize>>,
}

impl GraphSite {
    /// `edges` maps a page name to the space-separated names it links to.
    pub fn new(edges: &[(&str, &str)]) -> Self {
        Self {
            links: edges
                .iter()
                .map(|(from, to)| (url(from), to.split_whitespace().map(url).collect()))
                .collect(),
            failing: HashMap::new(),
            raw: HashMap::new(),
            delay: Duration::ZERO,
            fetches: Mutex::new(HashMap::new()),
        }
    }

    pub fn failing(mut self, name: &str, error: FetchError) -> Self {
        self.failing.insert(url(name), error);
        self
    }

    /// Serves `body` verbatim as HTML for `name` instead of rendering links.
    pub fn raw_page(mut self, name: &str, body: &[u8]) -> Self {
        self.raw.insert(url(name), body.to_vec());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn fetch_count(&self, name: &str) -> usize {
        self.fetches
            .lock()
            .unwrap()
            .get(&url(name))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetches.lock().unwrap().values().sum()
    }

    pub fn max_fetches_per_url(&self) -> usize {
        self.fetches
            .lock()
            .unwrap()
            .values()
            .copied()
            .max()
            .unwrap_or(0)
    }

    fn render(links: &[String]) -> String {
        let anchors: String = links
            .iter()
            .map(|link| format!(r#"<li><a href="{link}">{link}</a></li>"#))
            .collect();
        format!("<html><body><ul>{anchors}</ul></body></html>")
    }
}

#[async_trait]
impl Fetcher for GraphSite {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        *self
            .fetches
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_insert(0) += 1;

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(error) = self.failing.get(url) {
            return Err(error.clone());
        }

        if let Some(body) = self.raw.get(url) {
            return Ok(FetchedPage::new(url, Some("text/html"), body.clone()));
        }

        let links = self.links.get(url).map(Vec::as_slice).unwrap_or_default();
        Ok(FetchedPage::new(
            url,
            Some("text/html; charset=utf-8"),
            Self::render(links),
        ))
    }
}

/// Runs a crawl from `seed` over `site` and returns the report.
pub async fn crawl(site: Arc<GraphSite>, seed: &str, max_depth: u32, workers: usize) -> CrawlReport {
    let config = CrawlConfig::new(max_depth)
        .with_workers(NonZeroUsize::new(workers).expect("workers must be positive"));
    let crawler = Crawler::new(config, site, Arc::new(DocumentExtractor));
    tokio::time::timeout(Duration::from_secs(10), crawler.run(&url(seed)))
        .await
        .expect("crawl did not terminate")
        .expect("crawl failed")
}

pub fn names(report: &CrawlReport) -> Vec<String> {
    report
        .visited
        .iter()
        .map(|u| u.trim_start_matches(HOST).trim_start_matches('/').to_string())
        .collect()
}
