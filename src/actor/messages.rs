//! Message types for the update pipeline.
//!
//! These define the protocol between producers and the serializer thread.

use crate::sequence::Sequence;

/// An update request submitted by a producer.
#[derive(Debug, Clone)]
pub enum Request<T> {
    /// Stop displaying anything.
    Clear,

    /// Display this sequence next.
    Replace(Sequence<T>),

    /// Recompute change payloads for the sequence already displayed.
    ///
    /// Used when items changed content in place without a new sequence
    /// being published.
    RefreshPayloads,
}

impl<T> Request<T> {
    /// Build the request matching `update(seq)`: `None` clears.
    pub fn from_update(seq: Option<Sequence<T>>) -> Self {
        seq.map_or(Self::Clear, Self::Replace)
    }

    /// Short name for logging.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Replace(_) => "replace",
            Self::RefreshPayloads => "refresh-payloads",
        }
    }
}

/// Runs once the request it was submitted with has been applied.
pub(crate) type CommitFn = Box<dyn FnOnce() + Send + 'static>;

/// A request as it travels through the mailbox.
pub(crate) struct Envelope<T> {
    /// The request itself.
    pub request: Request<T>,
    /// Submission order stamp.
    pub generation: u64,
    /// Commit callback, dropped without running if the request is superseded.
    pub on_commit: Option<CommitFn>,
}

/// What happened to a processed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// State and display were updated.
    Committed,
    /// Nothing to do (same sequence, or nothing displayed).
    Unchanged,
    /// Cancellation was observed before anything was applied.
    Cancelled,
}
