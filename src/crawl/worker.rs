// src/crawl/worker.rs
// =============================================================================
// One member of the worker pool.
//
// Loop per item:
//   dequeue -> claim -> fetch -> (extract -> enqueue children) -> retire
//
// Every per-item problem (duplicate, fetch failure, parse failure) ends with
// the item being retired and the loop moving on. The only thing that stops a
// worker early is a broken pending counter, which it reports upwards after
// aborting the frontier so the other workers wake up and leave too.
// =============================================================================

use std::sync::Arc;

use tracing::{debug, error, info, trace, warn};

use super::coordinator::Shared;
use super::{normalize_url, WorkItem};
use crate::error::TerminationError;

pub(crate) struct Worker {
    id: usize,
    shared: Arc<Shared>,
}

impl Worker {
    pub(crate) fn new(id: usize, shared: Arc<Shared>) -> Self {
        Self { id, shared }
    }

    /// Runs until the frontier is closed and drained. Returns how many items
    /// this worker retired.
    pub(crate) async fn run(self) -> Result<usize, TerminationError> {
        let frontier = &self.shared.frontier;
        let mut processed = 0usize;

        while let Some(lease) = frontier.dequeue().await {
            self.process(lease.item()).await;

            if let Err(e) = lease.retire() {
                error!(worker = self.id, error = %e, "Pending counter corrupted, aborting crawl");
                frontier.abort();
                return Err(e);
            }
            processed += 1;
        }

        debug!(worker = self.id, processed, "No more work, worker exiting");
        Ok(processed)
    }

    async fn process(&self, item: &WorkItem) {
        let shared = &self.shared;
        let max_depth = shared.config.max_depth;

        // Producers never enqueue past max depth; this only catches bugs
        if item.depth > max_depth {
            warn!(url = %item.url, depth = item.depth, max_depth, "Item beyond max depth, skipped");
            return;
        }

        if !shared.visited.try_claim(&item.url) {
            trace!(url = %item.url, "Already visited");
            shared.stats.record_duplicate();
            return;
        }

        info!(url = %item.url, depth = item.depth, "Fetching");
        let page = match shared.fetcher.fetch(&item.url).await {
            Ok(page) => page,
            Err(e) => {
                shared.record_failure(item, e.kind(), e.to_string());
                return;
            }
        };
        shared.stats.record_fetched();

        if item.depth >= max_depth {
            debug!(url = %item.url, "Max depth reached, links not followed");
            return;
        }

        // After a cancel the frontier refuses every child; fan_out counts them
        match shared.extractor.extract_links(&page) {
            Ok(links) => self.fan_out(item, links),
            Err(e) => shared.record_failure(item, e.kind(), e.to_string()),
        }
    }

    // Enqueues the children of `parent`. Runs before `parent` is retired, so
    // every child is counted as pending while the parent still is.
    fn fan_out(&self, parent: &WorkItem, links: Vec<String>) {
        let shared = &self.shared;
        let found = links.len();
        let mut enqueued = 0usize;

        for link in links {
            let Some(url) = normalize_url(&link) else {
                continue;
            };
            if !shared.scope.allows(&url) {
                shared.stats.record_out_of_scope();
                continue;
            }
            // Skips most repeats early; try_claim still settles races
            if shared.visited.contains(&url) {
                shared.stats.record_duplicate();
                continue;
            }
            if shared.frontier.enqueue(parent.child(url)) {
                enqueued += 1;
            } else {
                shared.stats.record_discarded();
            }
        }

        if enqueued == 0 && shared.frontier.is_closed() {
            debug!(url = %parent.url, found, "Frontier closed, links not followed");
        } else {
            debug!(url = %parent.url, found, enqueued, "Links extracted");
        }
    }
}
