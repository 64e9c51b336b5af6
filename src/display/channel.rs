//! Channel display: Forward notifications to the thread that owns the display.
//!
//! The differ applies edits on its own serializer thread. When the real
//! display lives on another thread (a render loop, a UI main thread), hand
//! the differ a [`ChannelDisplay`] and drain the [`DisplayReceiver`] from
//! the display's own loop.

use super::ListUpdateCallback;
use crate::diff::EditOp;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

/// Sending half: implements [`ListUpdateCallback`] by sending [`EditOp`]s.
pub struct ChannelDisplay<P> {
    sender: Sender<EditOp<P>>,
}

/// Receiving half, drained by the display-owning thread.
pub struct DisplayReceiver<P> {
    receiver: Receiver<EditOp<P>>,
}

/// Create a connected display channel.
///
/// The channel is unbounded so the differ never blocks on a slow display:
/// every operation has to be applied, in order, for the display to stay
/// consistent.
pub fn display_channel<P>() -> (ChannelDisplay<P>, DisplayReceiver<P>) {
    let (sender, receiver) = unbounded();
    (ChannelDisplay { sender }, DisplayReceiver { receiver })
}

impl<P> ChannelDisplay<P> {
    fn send(&self, op: EditOp<P>) {
        if self.sender.send(op).is_err() {
            log::debug!("display receiver dropped, discarding notification");
        }
    }
}

impl<P> ListUpdateCallback<P> for ChannelDisplay<P> {
    fn on_inserted(&mut self, position: usize, count: usize) {
        self.send(EditOp::Insert { position, count });
    }

    fn on_removed(&mut self, position: usize, count: usize) {
        self.send(EditOp::Remove { position, count });
    }

    fn on_moved(&mut self, from: usize, to: usize) {
        self.send(EditOp::Move { from, to });
    }

    fn on_changed(&mut self, position: usize, count: usize, payload: Option<P>) {
        self.send(EditOp::Change {
            position,
            count,
            payload,
        });
    }
}

impl<P> DisplayReceiver<P> {
    /// Poll for the next operation (non-blocking).
    ///
    /// Returns `None` if nothing is queued or the differ is gone.
    pub fn try_recv(&self) -> Option<EditOp<P>> {
        match self.receiver.try_recv() {
            Ok(op) => Some(op),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Wait for the next operation (blocking with timeout).
    pub fn recv_timeout(&self, timeout: Duration) -> Option<EditOp<P>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(op) => Some(op),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Drain all queued operations.
    pub fn drain(&self) -> Vec<EditOp<P>> {
        self.receiver.try_iter().collect()
    }

    /// Apply all queued operations to `display`, returning how many were applied.
    pub fn drain_into<D>(&self, display: &mut D) -> usize
    where
        D: ListUpdateCallback<P> + ?Sized,
    {
        let mut applied = 0;
        for op in self.receiver.try_iter() {
            op.dispatch_to(display);
            applied += 1;
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ops_arrive_in_order() {
        let (mut display, receiver) = display_channel::<()>();

        display.on_inserted(0, 3);
        display.on_moved(2, 0);
        display.on_changed(1, 1, None);

        assert_eq!(
            receiver.drain(),
            vec![
                EditOp::Insert {
                    position: 0,
                    count: 3
                },
                EditOp::Move { from: 2, to: 0 },
                EditOp::Change {
                    position: 1,
                    count: 1,
                    payload: None
                },
            ]
        );
        assert!(receiver.try_recv().is_none());
    }

    #[test]
    fn test_drain_into_forwards() {
        let (mut display, receiver) = display_channel::<()>();
        display.on_removed(4, 2);

        let mut collected: Vec<EditOp<()>> = Vec::new();
        assert_eq!(receiver.drain_into(&mut collected), 1);
        assert_eq!(
            collected,
            vec![EditOp::Remove {
                position: 4,
                count: 2
            }]
        );
    }

    #[test]
    fn test_queued_ops_survive_disconnect() {
        let (mut display, receiver) = display_channel::<()>();
        display.on_inserted(0, 1);
        drop(display);

        assert!(receiver.try_recv().is_some());
        assert!(receiver.recv_timeout(Duration::from_millis(50)).is_none());
    }
}
