// src/crawl/frontier.rs
// =============================================================================
// The frontier: a FIFO of work items shared by all workers, plus the pending
// counter that decides when the crawl is over.
//
// How termination works:
// 1. enqueue() bumps `pending` in the same critical section that pushes the
//    item, so an item is counted before anyone can see it
// 2. a worker that finishes an item retires its Lease *after* enqueueing the
//    item's children, so the children are already counted
// 3. the retire that takes `pending` from 1 to 0 closes the frontier, still
//    under the lock, and wakes every waiting worker
//
// "Queue is empty" on its own means nothing: another worker may be halfway
// through a fetch and about to add more. Only pending == 0 does.
//
// Waiting uses tokio's Notify, so idle workers are parked, not spinning. The
// std Mutex is never held across an .await.
// =============================================================================

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::Notify;

use super::WorkItem;
use crate::error::TerminationError;

// Why the frontier stopped handing out work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// Every item was retired
    Exhausted,
    /// Someone asked the crawl to stop
    Cancelled,
    /// The pending bookkeeping broke
    Aborted,
}

#[derive(Debug, Default)]
struct FrontierState {
    queue: VecDeque<WorkItem>,
    pending: usize,
    closed: Option<CloseReason>,
}

#[derive(Debug, Default)]
pub struct Frontier {
    state: Mutex<FrontierState>,
    available: Notify,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave the state half-updated
    // (every critical section is a few field writes), so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends `item` and counts it as pending. Returns `false` (and drops the
    /// item) if the frontier is already closed.
    pub fn enqueue(&self, item: WorkItem) -> bool {
        {
            let mut state = self.lock();
            if let Some(reason) = state.closed {
                tracing::debug!(url = %item.url, depth = item.depth, ?reason, "Frontier closed, item discarded");
                return false;
            }
            state.pending += 1;
            state.queue.push_back(item);
        }
        self.available.notify_one();
        true
    }

    /// Waits for the next item. Returns `None` once the frontier is closed and
    /// nothing is left to hand out.
    pub async fn dequeue(&self) -> Option<Lease<'_>> {
        loop {
            // Register interest before looking at the queue so a notify that
            // lands between the check and the await is not lost
            let notified = self.available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if let Some(item) = state.queue.pop_front() {
                    return Some(Lease {
                        frontier: self,
                        item,
                        retired: false,
                    });
                }
                if state.closed.is_some() {
                    return None;
                }
            }

            notified.await;
        }
    }

    // Marks one item as fully processed and returns how many are still pending
    fn retire_one(&self) -> Result<usize, TerminationError> {
        let remaining = {
            let mut state = self.lock();
            let remaining = state
                .pending
                .checked_sub(1)
                .ok_or(TerminationError::PendingUnderflow)?;
            state.pending = remaining;
            if remaining == 0 && state.closed.is_none() {
                state.closed = Some(CloseReason::Exhausted);
            }
            remaining
        };

        if remaining == 0 {
            tracing::debug!("Pending work reached zero, frontier closed");
            self.available.notify_waiters();
        }
        Ok(remaining)
    }

    /// Stops the crawl: queued items are dropped, workers finish what they
    /// hold and then exit. Returns `false` if the frontier was already closed.
    pub fn cancel(&self) -> bool {
        self.close(CloseReason::Cancelled)
    }

    pub(crate) fn abort(&self) -> bool {
        self.close(CloseReason::Aborted)
    }

    fn close(&self, reason: CloseReason) -> bool {
        let transitioned = {
            let mut state = self.lock();
            if state.closed.is_some() {
                false
            } else {
                let discarded = state.queue.len();
                state.queue.clear();
                // Dropped items will never be retired, so stop counting them
                state.pending -= discarded;
                state.closed = Some(reason);
                tracing::info!(?reason, discarded, in_flight = state.pending, "Frontier closed");
                true
            }
        };
        self.available.notify_waiters();
        transitioned
    }

    /// Items enqueued but not yet retired (queued + in flight).
    pub fn pending(&self) -> usize {
        self.lock().pending
    }

    /// Items waiting in the queue.
    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().queue.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed.is_some()
    }

    pub fn close_reason(&self) -> Option<CloseReason> {
        self.lock().closed
    }
}

/// A dequeued item that still owes the frontier one retirement.
///
/// Call [`Lease::retire`] once the item and its children are done. A lease
/// that is dropped instead (for example while a collaborator panics) retires
/// itself so the pending counter can still reach zero.
#[must_use = "a lease must be retired or the crawl never finishes"]
#[derive(Debug)]
pub struct Lease<'a> {
    frontier: &'a Frontier,
    item: WorkItem,
    retired: bool,
}

impl Lease<'_> {
    pub fn item(&self) -> &WorkItem {
        &self.item
    }

    /// Retires the item. Returns the number of items still pending.
    pub fn retire(mut self) -> Result<usize, TerminationError> {
        self.retired = true;
        self.frontier.retire_one()
    }
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        if self.retired {
            return;
        }
        tracing::warn!(url = %self.item.url, "Work item dropped without being retired");
        if let Err(e) = self.frontier.retire_one() {
            tracing::error!(error = %e, "Failed to retire dropped work item");
            self.frontier.abort();
        }
    }
}
