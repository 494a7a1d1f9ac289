//! Frontier: the shared queue of pending crawl work
//!
//! Multiple producers (list handlers) and consumers (the worker pool)
//! operate on it without external locking. Consumers observe exhaustion:
//! `next` returns `None` only once the queue is empty and no item is still
//! being processed, since an in-flight listing page may yet produce work.
//! Taken items release their in-flight accounting on drop, so a panicking
//! handler cannot wedge exhaustion detection.

use std::collections::VecDeque;
use std::ops::Deref;
use std::sync::Mutex;
use tokio::sync::Notify;
use url::Url;

/// Role a work item plays in the crawl state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// A listing page at the given 1-based page number
    List { page: u32 },
    /// A job detail page
    Detail,
}

/// One unit of crawl work; immutable once enqueued
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub url: Url,
    pub role: Role,
}

impl WorkItem {
    pub fn list(url: Url, page: u32) -> Self {
        Self {
            url,
            role: Role::List { page },
        }
    }

    pub fn detail(url: Url) -> Self {
        Self {
            url,
            role: Role::Detail,
        }
    }
}

/// A work item taken from the frontier.
///
/// Counts as in flight until dropped; drop it only once handling is done,
/// or exhaustion will be reported while the item may still produce work.
pub struct ActiveItem<'a> {
    item: WorkItem,
    frontier: &'a Frontier,
}

impl Deref for ActiveItem<'_> {
    type Target = WorkItem;

    fn deref(&self) -> &WorkItem {
        &self.item
    }
}

impl Drop for ActiveItem<'_> {
    fn drop(&mut self) {
        self.frontier.task_done();
    }
}

#[derive(Default)]
struct FrontierInner {
    queue: VecDeque<WorkItem>,
    in_flight: usize,
}

/// Concurrent work queue with exhaustion detection
#[derive(Default)]
pub struct Frontier {
    inner: Mutex<FrontierInner>,
    notify: Notify,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a work item and wakes waiting consumers
    pub fn push(&self, item: WorkItem) {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.queue.push_back(item);
        }
        self.notify.notify_waiters();
    }

    /// Takes the next work item, waiting while other workers may still
    /// produce more. Returns `None` when the frontier is exhausted.
    pub async fn next(&self) -> Option<ActiveItem<'_>> {
        loop {
            // Register for wakeups before checking state, so a push between
            // the check and the await is not missed.
            let notified = self.notify.notified();
            {
                let mut inner = self.inner.lock().unwrap();
                if let Some(item) = inner.queue.pop_front() {
                    inner.in_flight += 1;
                    return Some(ActiveItem {
                        item,
                        frontier: self,
                    });
                }
                if inner.in_flight == 0 {
                    // Exhausted; wake the other waiters so they see it too
                    self.notify.notify_waiters();
                    return None;
                }
            }
            notified.await;
        }
    }

    /// Marks one taken item as fully handled; called from [`ActiveItem`]'s
    /// drop
    fn task_done(&self) {
        {
            let mut inner = self.inner.lock().unwrap();
            debug_assert!(inner.in_flight > 0);
            inner.in_flight = inner.in_flight.saturating_sub(1);
        }
        self.notify.notify_waiters();
    }

    /// Number of queued (not in-flight) items
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
