//! Shared crawl state: the result quota counter and the visited-URL set
//!
//! These are the only two pieces of mutable state shared across workers.
//! Both are monotonic: the counter only increments and the set only grows.
//! The quota check-then-increment is a single locked operation so `saved`
//! can never overshoot the quota under concurrent detail handlers.

use std::collections::HashSet;
use std::sync::Mutex;

/// Process-scoped crawl state owned by the controller and shared with
/// handlers by `Arc`
pub struct CrawlState {
    quota: usize,
    dedupe: bool,
    saved: Mutex<usize>,
    visited: Mutex<HashSet<String>>,
}

impl CrawlState {
    /// Creates crawl state for a run with the given result quota.
    ///
    /// With `dedupe` disabled the global visited check becomes a no-op;
    /// in-page link dedup is unaffected.
    pub fn new(quota: usize, dedupe: bool) -> Self {
        Self {
            quota,
            dedupe,
            saved: Mutex::new(0),
            visited: Mutex::new(HashSet::new()),
        }
    }

    /// Number of records emitted so far
    pub fn saved(&self) -> usize {
        *self.saved.lock().unwrap()
    }

    /// Configured result quota
    pub fn quota(&self) -> usize {
        self.quota
    }

    /// Whether the quota has been met
    pub fn quota_reached(&self) -> bool {
        self.saved() >= self.quota
    }

    /// Records still needed to meet the quota
    pub fn remaining(&self) -> usize {
        self.quota.saturating_sub(self.saved())
    }

    /// Claims one emission slot.
    ///
    /// Returns true and increments the counter when the quota has room,
    /// false once it is met. Check and increment happen under one lock.
    pub fn try_claim(&self) -> bool {
        let mut saved = self.saved.lock().unwrap();
        if *saved >= self.quota {
            return false;
        }
        *saved += 1;
        true
    }

    /// Returns a previously claimed slot.
    ///
    /// Called when emission fails after a successful claim, so `saved`
    /// remains a count of records actually written.
    pub fn release_claim(&self) {
        let mut saved = self.saved.lock().unwrap();
        *saved = saved.saturating_sub(1);
    }

    /// Claims a detail URL for processing.
    ///
    /// Returns false when the URL was already claimed this run. The set only
    /// grows; nothing is ever removed.
    pub fn claim_url(&self, url: &str) -> bool {
        if !self.dedupe {
            return true;
        }
        self.visited.lock().unwrap().insert(url.to_string())
    }

    /// Whether a URL has been claimed already (always false with dedup off)
    pub fn is_visited(&self, url: &str) -> bool {
        self.dedupe && self.visited.lock().unwrap().contains(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_claims_stop_at_quota() {
        let state = CrawlState::new(3, true);
        assert!(state.try_claim());
        assert!(state.try_claim());
        assert!(state.try_claim());
        assert!(!state.try_claim());
        assert_eq!(state.saved(), 3);
        assert!(state.quota_reached());
    }

    #[test]
    fn test_remaining() {
        let state = CrawlState::new(5, true);
        assert_eq!(state.remaining(), 5);
        state.try_claim();
        assert_eq!(state.remaining(), 4);
    }

    #[test]
    fn test_release_returns_the_slot() {
        let state = CrawlState::new(1, true);
        assert!(state.try_claim());
        assert!(!state.try_claim());
        state.release_claim();
        assert_eq!(state.saved(), 0);
        assert!(state.try_claim());
    }

    #[test]
    fn test_url_claimed_once() {
        let state = CrawlState::new(10, true);
        assert!(state.claim_url("https://careerviet.vn/jobs/a-1.html"));
        assert!(!state.claim_url("https://careerviet.vn/jobs/a-1.html"));
        assert!(state.is_visited("https://careerviet.vn/jobs/a-1.html"));
    }

    #[test]
    fn test_dedupe_disabled() {
        let state = CrawlState::new(10, false);
        assert!(state.claim_url("https://careerviet.vn/jobs/a-1.html"));
        assert!(state.claim_url("https://careerviet.vn/jobs/a-1.html"));
        assert!(!state.is_visited("https://careerviet.vn/jobs/a-1.html"));
    }

    #[test]
    fn test_no_overshoot_under_concurrency() {
        let state = Arc::new(CrawlState::new(50, true));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let state = Arc::clone(&state);
            handles.push(std::thread::spawn(move || {
                let mut claimed = 0;
                for _ in 0..100 {
                    if state.try_claim() {
                        claimed += 1;
                    }
                }
                claimed
            }));
        }
        let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 50);
        assert_eq!(state.saved(), 50);
    }
}
