//! Cancellation token shared by everything bound to one owning scope.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A one-way cancellation flag.
///
/// Clones observe the same flag, so one token can tear down several
/// differs owned by the same component.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel every holder of this token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Check whether [`cancel`](Self::cancel) was called.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
