// src/crawl/coordinator.rs
// =============================================================================
// The coordinator owns one crawl from seed to report.
//
// What happens in Crawler::run:
// 1. Normalize the seed and work out the scope filter
// 2. Put the seed in the frontier (pending = 1 before any worker exists)
// 3. Spawn exactly N worker tasks sharing the frontier and visited set
// 4. Wait for all of them; the last retirement closes the frontier, which is
//    what makes them exit
// 5. Turn the shared counters into a CrawlReport
//
// A CancelHandle can close the frontier from outside (Ctrl-C in the binary).
// =============================================================================

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, error, info, warn, Instrument};
use url::Url;

use super::frontier::{CloseReason, Frontier};
use super::visited::{normalize_url, VisitedSet};
use super::worker::Worker;
use super::{CrawlConfig, CrawlScope, ScopeFilter, WorkItem};
use crate::error::{CrawlError, FailureKind};
use crate::extract::LinkExtractor;
use crate::fetch::Fetcher;

// A URL that could not be processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlFailure {
    pub url: String,
    pub depth: u32,
    pub kind: FailureKind,
    pub reason: String,
}

/// Summary of a finished crawl.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub seed: String,
    pub max_depth: u32,
    pub workers: usize,
    /// Every URL a worker claimed, sorted
    pub visited: Vec<String>,
    /// Claimed URLs whose fetch succeeded
    pub fetched: usize,
    /// Links skipped because they were already claimed
    pub duplicates: usize,
    /// Links dropped because the frontier had closed
    pub discarded: usize,
    /// Links dropped by the scope filter
    pub out_of_scope: usize,
    pub failures: Vec<CrawlFailure>,
    pub cancelled: bool,
    /// Set when every worker died with work still queued
    pub aborted: bool,
    /// Set when allocation failures reached the configured alarm level
    pub degraded: bool,
    pub panicked_workers: usize,
    pub elapsed_ms: u64,
}

impl CrawlReport {
    pub fn failure_count(&self, kind: FailureKind) -> usize {
        self.failures.iter().filter(|f| f.kind == kind).count()
    }
}

// Counters updated by all workers
#[derive(Debug, Default)]
pub(crate) struct CrawlStats {
    fetched: AtomicUsize,
    duplicates: AtomicUsize,
    discarded: AtomicUsize,
    out_of_scope: AtomicUsize,
    allocation_failures: AtomicUsize,
    degraded: AtomicBool,
    failures: Mutex<Vec<CrawlFailure>>,
}

impl CrawlStats {
    pub(crate) fn record_fetched(&self) {
        self.fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_duplicate(&self) {
        self.duplicates.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_discarded(&self) {
        self.discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_out_of_scope(&self) {
        self.out_of_scope.fetch_add(1, Ordering::Relaxed);
    }

    fn failures(&self) -> Vec<CrawlFailure> {
        let mut failures = self
            .failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        failures.sort_by(|a, b| a.url.cmp(&b.url));
        failures
    }
}

// State shared by the workers of one crawl
pub(crate) struct Shared {
    pub(crate) config: CrawlConfig,
    pub(crate) scope: ScopeFilter,
    pub(crate) frontier: Arc<Frontier>,
    pub(crate) visited: VisitedSet,
    pub(crate) stats: CrawlStats,
    pub(crate) fetcher: Arc<dyn Fetcher>,
    pub(crate) extractor: Arc<dyn LinkExtractor>,
}

impl Shared {
    pub(crate) fn record_failure(&self, item: &WorkItem, kind: FailureKind, reason: String) {
        warn!(url = %item.url, depth = item.depth, ?kind, %reason, "Failed to process page");

        if kind == FailureKind::Allocation {
            let seen = self.stats.allocation_failures.fetch_add(1, Ordering::Relaxed) + 1;
            if seen == self.config.allocation_alarm {
                warn!(
                    allocation_failures = seen,
                    "Repeated allocation failures, crawl is degraded"
                );
                self.stats.degraded.store(true, Ordering::Relaxed);
            }
        }

        self.stats
            .failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(CrawlFailure {
                url: item.url.clone(),
                depth: item.depth,
                kind,
                reason,
            });
    }
}

/// Stops a running crawl from another task.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    frontier: Arc<Frontier>,
}

impl CancelHandle {
    /// Returns `false` if the crawl had already finished or been cancelled.
    pub fn cancel(&self) -> bool {
        self.frontier.cancel()
    }
}

/// One crawl: construct, optionally grab a cancel handle, then `run`.
pub struct Crawler {
    config: CrawlConfig,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn LinkExtractor>,
    frontier: Arc<Frontier>,
}

impl Crawler {
    pub fn new(
        config: CrawlConfig,
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn LinkExtractor>,
    ) -> Self {
        Self {
            config,
            fetcher,
            extractor,
            frontier: Arc::new(Frontier::new()),
        }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            frontier: Arc::clone(&self.frontier),
        }
    }

    pub async fn run(self, seed: &str) -> Result<CrawlReport, CrawlError> {
        let seed_url = normalize_url(seed).ok_or_else(|| CrawlError::InvalidSeed {
            url: seed.to_string(),
            reason: "URL is empty",
        })?;
        let scope = scope_filter(&self.config.scope, &seed_url)?;
        let workers = self.config.workers.get();
        let started = Instant::now();

        info!(
            seed = %seed_url,
            max_depth = self.config.max_depth,
            workers,
            "Starting crawl"
        );

        self.frontier.enqueue(WorkItem::seed(seed_url.clone()));

        let shared = Arc::new(Shared {
            config: self.config,
            scope,
            frontier: Arc::clone(&self.frontier),
            visited: VisitedSet::new(),
            stats: CrawlStats::default(),
            fetcher: self.fetcher,
            extractor: self.extractor,
        });

        let handles = (0..workers).map(|id| {
            let worker = Worker::new(id, Arc::clone(&shared));
            tokio::spawn(worker.run().instrument(tracing::info_span!("worker", id)))
        });

        let mut panicked_workers = 0;
        let mut violation = None;
        for (id, result) in join_all(handles).await.into_iter().enumerate() {
            match result {
                Ok(Ok(processed)) => debug!(worker = id, processed, "Worker joined"),
                Ok(Err(e)) => {
                    violation.get_or_insert(e);
                }
                Err(join_error) => {
                    panicked_workers += 1;
                    error!(worker = id, error = %join_error, "Worker panicked");
                }
            }
        }

        if let Some(e) = violation {
            return Err(e.into());
        }

        // Only reachable if every worker died with work still queued
        if !self.frontier.is_closed() {
            error!(
                pending = self.frontier.pending(),
                "All workers stopped before the crawl finished"
            );
            self.frontier.abort();
        }

        let stats = &shared.stats;
        let report = CrawlReport {
            seed: seed_url,
            max_depth: shared.config.max_depth,
            workers,
            visited: shared.visited.snapshot(),
            fetched: stats.fetched.load(Ordering::Relaxed),
            duplicates: stats.duplicates.load(Ordering::Relaxed),
            discarded: stats.discarded.load(Ordering::Relaxed),
            out_of_scope: stats.out_of_scope.load(Ordering::Relaxed),
            failures: stats.failures(),
            cancelled: self.frontier.close_reason() == Some(CloseReason::Cancelled),
            aborted: self.frontier.close_reason() == Some(CloseReason::Aborted),
            degraded: stats.degraded.load(Ordering::Relaxed),
            panicked_workers,
            elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };

        info!(
            visited = report.visited.len(),
            fetched = report.fetched,
            failures = report.failures.len(),
            cancelled = report.cancelled,
            aborted = report.aborted,
            elapsed_ms = report.elapsed_ms,
            "Crawl finished"
        );
        Ok(report)
    }
}

fn scope_filter(scope: &CrawlScope, seed: &str) -> Result<ScopeFilter, CrawlError> {
    match scope {
        CrawlScope::Any => Ok(ScopeFilter::Any),
        CrawlScope::SameHost => Url::parse(seed)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .map(ScopeFilter::Host)
            .ok_or_else(|| CrawlError::InvalidSeed {
                url: seed.to_string(),
                reason: "URL has no host to restrict the crawl to",
            }),
    }
}
