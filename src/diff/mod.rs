//! Diff module: Turn two item sequences into an edit script.
//!
//! This module contains:
//! - [`ItemComparator`]: Identity, content and payload decisions for items
//! - [`ItemCallback`]: Position-based bridge the engine queries
//! - [`compute_diff`]: Linear-space Myers diff producing an [`EditScript`]
//! - [`EditOp`]: Insert, remove, move and change operations

mod callback;
mod comparator;
mod error;
pub mod myers;
mod ops;

pub use callback::ItemCallback;
pub use comparator::{EqComparator, ItemComparator, KeyComparator};
pub use error::DiffError;
pub use myers::compute_diff;
pub use ops::{EditOp, EditScript};
