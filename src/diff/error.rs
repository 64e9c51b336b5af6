//! Errors raised while computing a diff.

use std::fmt;

/// Why a diff computation was abandoned.
///
/// None of these are recoverable for the request that raised them: the
/// displayed state is left untouched and a later update has to try again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffError {
    /// Exactly one side of a compared pair had no item at its position.
    AbsentItem {
        /// Position looked up in the old sequence.
        old_position: usize,
        /// Position looked up in the new sequence.
        new_position: usize,
        /// Whether the old side was the absent one.
        old_missing: bool,
    },
    /// The comparator panicked on the diff worker.
    WorkerPanicked(String),
    /// The diff worker thread is no longer running.
    WorkerGone,
}

impl fmt::Display for DiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AbsentItem {
                old_position,
                new_position,
                old_missing,
            } => {
                let side = if *old_missing { "old" } else { "new" };
                write!(
                    f,
                    "comparator invoked on ({old_position}, {new_position}) with the {side} item absent"
                )
            }
            Self::WorkerPanicked(message) => write!(f, "diff worker panicked: {message}"),
            Self::WorkerGone => f.write_str("diff worker is gone"),
        }
    }
}

impl std::error::Error for DiffError {}
