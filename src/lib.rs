//! # Flywheel List
//!
//! Asynchronous list differ for row displays.
//!
//! Producers publish whole new sequences from any thread; Flywheel List
//! works out the edit script in the background and applies it to the
//! display so that what is shown and what [`AsyncListDiffer::current`]
//! reports never drift apart.
//!
//! ## Core Concepts
//!
//! - **Latest wins**: A single-slot mailbox conflates bursts of updates
//! - **Single consumer**: One serializer thread owns the state and the display
//! - **Background diffing**: Myers diff runs on a dedicated worker thread
//! - **Cancellation**: A token tears the pipeline down without partial dispatches
//!
//! ## Example
//!
//! ```rust,ignore
//! use flywheel_list::{display_channel, AsyncListDiffer, EqComparator, Sequence};
//!
//! let (display, rows) = display_channel();
//! let differ = AsyncListDiffer::builder(display, EqComparator).spawn()?;
//!
//! differ.update(Some(Sequence::from(vec!['a', 'b', 'c'])));
//! differ.update(Some(Sequence::from(vec!['a', 'c', 'd'])));
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod actor;
pub mod diff;
pub mod display;
pub mod sequence;

// Re-exports for convenience
pub use actor::{
    AsyncListDiffer, CancelToken, CurrentListListener, DifferBuilder, DifferConfig, DifferStats,
    Request,
};
pub use diff::{compute_diff, DiffError, EditOp, EditScript, EqComparator, ItemComparator, KeyComparator};
pub use display::{display_channel, BatchingCallback, ChannelDisplay, DisplayReceiver, ListUpdateCallback};
pub use sequence::Sequence;
