//! Pipeline statistics and idle tracking shared between producers and the serializer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Counters for debugging/profiling a differ.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DifferStats {
    /// Requests accepted by `submit`.
    pub submitted: u64,
    /// Requests superseded in the mailbox before being processed.
    pub conflated: u64,
    /// Diffs computed to completion on the worker.
    pub diffs_computed: u64,
    /// Diffs that failed and were discarded.
    pub diff_failures: u64,
    /// Requests that changed the displayed state.
    pub commits: u64,
    /// Requests that turned out to be no-ops.
    pub unchanged: u64,
}

/// Shared state behind [`DifferStats`] and `wait_idle`.
#[derive(Debug, Default)]
pub(crate) struct Progress {
    submitted: AtomicU64,
    conflated: AtomicU64,
    diffs_computed: AtomicU64,
    diff_failures: AtomicU64,
    commits: AtomicU64,
    unchanged: AtomicU64,
    /// Generation of the last request the serializer finished.
    processed: Mutex<u64>,
    idle: Condvar,
}

impl Progress {
    /// Stamp a new submission, returning its generation.
    pub fn next_generation(&self) -> u64 {
        self.submitted.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn record_conflated(&self, count: usize) {
        self.conflated.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_diff(&self) {
        self.diffs_computed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.diff_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_commit(&self) {
        self.commits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unchanged(&self) {
        self.unchanged.fetch_add(1, Ordering::Relaxed);
    }

    /// Mark every request up to `generation` as handled.
    pub fn complete(&self, generation: u64) {
        let mut processed = self.processed.lock().unwrap_or_else(PoisonError::into_inner);
        *processed = (*processed).max(generation);
        self.idle.notify_all();
    }

    /// Wake idle waiters without completing anything (e.g. on cancellation).
    pub fn wake(&self) {
        let _guard = self.processed.lock().unwrap_or_else(PoisonError::into_inner);
        self.idle.notify_all();
    }

    /// Block until the latest submission is handled, `stop()` holds, or `timeout` passes.
    pub fn wait_idle(&self, timeout: Duration, stop: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        let mut processed = self.processed.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if *processed >= self.submitted.load(Ordering::Acquire) {
                return true;
            }
            let now = Instant::now();
            if stop() || now >= deadline {
                return false;
            }
            processed = self
                .idle
                .wait_timeout(processed, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    pub fn snapshot(&self) -> DifferStats {
        DifferStats {
            submitted: self.submitted.load(Ordering::Acquire),
            conflated: self.conflated.load(Ordering::Relaxed),
            diffs_computed: self.diffs_computed.load(Ordering::Relaxed),
            diff_failures: self.diff_failures.load(Ordering::Relaxed),
            commits: self.commits.load(Ordering::Relaxed),
            unchanged: self.unchanged.load(Ordering::Relaxed),
        }
    }
}
