//! Display: The narrow interface the differ drives.
//!
//! This module contains:
//! - [`ListUpdateCallback`]: What a row display must accept
//! - [`BatchingCallback`]: Coalesces adjacent notifications before forwarding
//! - [`display_channel`]: Forwards notifications to a display-owning thread

mod batching;
mod channel;

pub use batching::BatchingCallback;
pub use channel::{display_channel, ChannelDisplay, DisplayReceiver};

/// Receives row-level notifications for a displayed list.
///
/// The differ calls these from its serializer thread, strictly in order and
/// never concurrently. Displays bound to another thread can go through
/// [`display_channel`].
pub trait ListUpdateCallback<P> {
    /// `count` rows were inserted at `position`.
    fn on_inserted(&mut self, position: usize, count: usize);

    /// `count` rows were removed starting at `position`.
    fn on_removed(&mut self, position: usize, count: usize);

    /// The row at `from` now sits at `to`.
    fn on_moved(&mut self, from: usize, to: usize);

    /// `count` rows starting at `position` changed content.
    fn on_changed(&mut self, position: usize, count: usize, payload: Option<P>);
}

impl<P, D: ListUpdateCallback<P> + ?Sized> ListUpdateCallback<P> for Box<D> {
    fn on_inserted(&mut self, position: usize, count: usize) {
        (**self).on_inserted(position, count);
    }

    fn on_removed(&mut self, position: usize, count: usize) {
        (**self).on_removed(position, count);
    }

    fn on_moved(&mut self, from: usize, to: usize) {
        (**self).on_moved(from, to);
    }

    fn on_changed(&mut self, position: usize, count: usize, payload: Option<P>) {
        (**self).on_changed(position, count, payload);
    }
}

/// Collects notifications as [`EditOp`](crate::EditOp)s.
impl<P> ListUpdateCallback<P> for Vec<crate::EditOp<P>> {
    fn on_inserted(&mut self, position: usize, count: usize) {
        self.push(crate::EditOp::Insert { position, count });
    }

    fn on_removed(&mut self, position: usize, count: usize) {
        self.push(crate::EditOp::Remove { position, count });
    }

    fn on_moved(&mut self, from: usize, to: usize) {
        self.push(crate::EditOp::Move { from, to });
    }

    fn on_changed(&mut self, position: usize, count: usize, payload: Option<P>) {
        self.push(crate::EditOp::Change {
            position,
            count,
            payload,
        });
    }
}
