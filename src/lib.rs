// src/lib.rs
// =============================================================================
// Library root for link-crawler.
//
// Modules:
// - crawl: frontier, visited set, workers and the coordinator (the core)
// - fetch: the Fetcher trait and the reqwest implementation
// - extract: the LinkExtractor trait with HTML and Markdown extractors
// - error: error types shared by all of the above
//
// The `crawl` binary in src/main.rs is a thin layer over this library.
// =============================================================================

pub mod crawl;
pub mod error;
pub mod extract;
pub mod fetch;

pub use crawl::{
    normalize_url, CancelHandle, CloseReason, CrawlConfig, CrawlFailure, CrawlReport, CrawlScope,
    Crawler, Frontier, Lease, VisitedSet, WorkItem, DEFAULT_ALLOCATION_ALARM, DEFAULT_WORKERS,
};
pub use error::{CrawlError, FailureKind, FetchError, ParseError, TerminationError};
pub use extract::{DocumentExtractor, LinkExtractor};
pub use fetch::{FetchSettings, FetchedPage, Fetcher, HttpFetcher};
