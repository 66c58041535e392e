// src/crawl/mod.rs
// =============================================================================
// This module is the crawl core.
//
// Pieces:
// - frontier: the shared FIFO of work plus the pending counter that tells us
//   when the crawl is finished
// - visited: the "claim a URL exactly once" set
// - worker: the dequeue -> claim -> fetch -> extract -> enqueue -> retire loop
// - coordinator: owns one crawl, starts the workers, joins them, reports
//
// Everything here lives for one Crawler::run call. There are no globals, so
// several crawls can run side by side in one process.
// =============================================================================

mod coordinator;
mod frontier;
mod visited;
mod worker;

use std::num::NonZeroUsize;

use url::Url;

pub use coordinator::{CancelHandle, CrawlFailure, CrawlReport, Crawler};
pub use frontier::{CloseReason, Frontier, Lease};
pub use visited::{normalize_url, VisitedSet};

/// Worker count used when none is given.
pub const DEFAULT_WORKERS: usize = 4;
/// Allocation failures tolerated before the crawl is flagged as degraded.
pub const DEFAULT_ALLOCATION_ALARM: usize = 3;

// One unit of work: a URL and how many hops it is from the seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub url: String,
    pub depth: u32,
}

impl WorkItem {
    pub fn seed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            depth: 0,
        }
    }

    /// A link found on this item's page, one hop further away.
    pub fn child(&self, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            depth: self.depth + 1,
        }
    }
}

// Which discovered links are allowed into the frontier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CrawlScope {
    /// Follow every http(s) link
    #[default]
    Any,
    /// Only follow links whose host equals the seed's host
    SameHost,
}

// The host a link has to match, resolved once from the seed
#[derive(Debug, Clone)]
pub(crate) enum ScopeFilter {
    Any,
    Host(String),
}

impl ScopeFilter {
    pub(crate) fn allows(&self, url: &str) -> bool {
        match self {
            ScopeFilter::Any => true,
            ScopeFilter::Host(host) => Url::parse(url)
                .ok()
                .and_then(|parsed| parsed.host_str().map(|h| h.eq_ignore_ascii_case(host)))
                .unwrap_or(false),
        }
    }
}

/// Settings for one crawl.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub max_depth: u32,
    pub workers: NonZeroUsize,
    pub scope: CrawlScope,
    pub allocation_alarm: usize,
}

impl CrawlConfig {
    pub fn new(max_depth: u32) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    pub fn with_workers(mut self, workers: NonZeroUsize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_scope(mut self, scope: CrawlScope) -> Self {
        self.scope = scope;
        self
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: 0,
            workers: NonZeroUsize::new(DEFAULT_WORKERS).unwrap_or(NonZeroUsize::MIN),
            scope: CrawlScope::Any,
            allocation_alarm: DEFAULT_ALLOCATION_ALARM,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_is_one_hop_deeper() {
        let seed = WorkItem::seed("https://example.com");
        let child = seed.child("https://example.com/a");
        assert_eq!(seed.depth, 0);
        assert_eq!(child.depth, 1);
        assert_eq!(child.child("https://example.com/b").depth, 2);
    }

    #[test]
    fn test_default_config() {
        let config = CrawlConfig::new(3);
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.workers.get(), DEFAULT_WORKERS);
        assert_eq!(config.scope, CrawlScope::Any);
    }

    #[test]
    fn test_host_filter() {
        let filter = ScopeFilter::Host("example.com".to_string());
        assert!(filter.allows("https://example.com/a"));
        assert!(filter.allows("http://EXAMPLE.com/b"));
        assert!(!filter.allows("https://other.com/"));
        assert!(!filter.allows("https://sub.example.com/"));
        assert!(ScopeFilter::Any.allows("https://other.com/"));
    }
}
