//! Conflated mailbox: A single-slot channel where the newest request wins.
//!
//! Posting never blocks. If the slot still holds a request the consumer has
//! not picked up yet, the producer takes it back out and puts its own in,
//! so the consumer only ever sees the latest request.
//!
//! Every sender keeps a receiver clone for taking stale requests back, so
//! the channel stays connected for as long as a sender exists.

use super::messages::Envelope;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::time::Duration;

/// Producer half. Cheap to clone, usable from any thread.
pub(crate) struct MailboxSender<T> {
    slot: Sender<Envelope<T>>,
    stale: Receiver<Envelope<T>>,
}

/// Consumer half, owned by the serializer thread.
pub(crate) struct MailboxReceiver<T> {
    slot: Receiver<Envelope<T>>,
}

/// Create a connected mailbox pair.
pub(crate) fn conflated<T>() -> (MailboxSender<T>, MailboxReceiver<T>) {
    let (slot_tx, slot_rx) = bounded(1);
    (
        MailboxSender {
            slot: slot_tx,
            stale: slot_rx.clone(),
        },
        MailboxReceiver { slot: slot_rx },
    )
}

impl<T> MailboxSender<T> {
    /// Put `envelope` into the slot, displacing whatever is waiting there.
    ///
    /// Returns the number of displaced envelopes. The posted envelope takes
    /// over the highest generation it displaced, so completing it covers
    /// everything it replaced even when producers stamped out of order.
    pub fn post(&self, mut envelope: Envelope<T>) -> usize {
        let mut displaced = 0;
        loop {
            match self.slot.try_send(envelope) {
                Ok(()) => return displaced,
                Err(TrySendError::Full(back)) => {
                    envelope = back;
                    // The consumer may win the race for the stale one; then the retry succeeds.
                    if let Ok(stale) = self.stale.try_recv() {
                        log::trace!(
                            "conflating pending {} #{} with #{}",
                            stale.request.kind(),
                            stale.generation,
                            envelope.generation
                        );
                        envelope.generation = envelope.generation.max(stale.generation);
                        displaced += 1;
                    }
                }
                // `stale` keeps the channel connected
                Err(TrySendError::Disconnected(_)) => return displaced,
            }
        }
    }
}

impl<T> Clone for MailboxSender<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
            stale: self.stale.clone(),
        }
    }
}

impl<T> MailboxReceiver<T> {
    /// Wait up to `timeout` for the latest request.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Envelope<T>> {
        self.slot.recv_timeout(timeout).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::messages::Request;
    use crate::sequence::Sequence;

    fn envelope(generation: u64) -> Envelope<u32> {
        Envelope {
            request: Request::Replace(Sequence::from(vec![u32::try_from(generation).unwrap()])),
            generation,
            on_commit: None,
        }
    }

    fn take(rx: &MailboxReceiver<u32>) -> Option<u64> {
        rx.recv_timeout(Duration::from_millis(20))
            .map(|env| env.generation)
    }

    #[test]
    fn test_latest_request_wins() {
        let (tx, rx) = conflated();

        assert_eq!(tx.post(envelope(1)), 0);
        assert_eq!(tx.post(envelope(2)), 1);
        assert_eq!(tx.post(envelope(3)), 1);

        assert_eq!(take(&rx), Some(3));
        assert_eq!(take(&rx), None);
    }

    #[test]
    fn test_taken_request_is_not_displaced() {
        let (tx, rx) = conflated();

        assert_eq!(tx.post(envelope(1)), 0);
        assert_eq!(take(&rx), Some(1));
        assert_eq!(tx.post(envelope(2)), 0);
        assert_eq!(take(&rx), Some(2));
    }

    #[test]
    fn test_superseded_commit_is_dropped_unrun() {
        let (tx, rx) = conflated::<u32>();
        let (ran_tx, ran_rx) = crossbeam_channel::unbounded();

        let mut first = envelope(1);
        first.on_commit = Some(Box::new(move || ran_tx.send(()).unwrap()));
        tx.post(first);
        tx.post(envelope(2));

        assert_eq!(take(&rx), Some(2));
        assert!(ran_rx.try_recv().is_err());
    }

    #[test]
    fn test_displacing_keeps_the_higher_generation() {
        let (tx, rx) = conflated();

        let mut older = envelope(4);
        older.request = Request::Replace(Sequence::from(vec![8]));
        tx.post(envelope(5));
        assert_eq!(tx.post(older), 1);

        let env = rx.recv_timeout(Duration::from_millis(20)).unwrap();
        assert_eq!(env.generation, 5);
        assert!(matches!(env.request, Request::Replace(seq) if seq.as_slice() == [8]));
    }

    #[test]
    fn test_idle_after_senders_dropped() {
        let (tx, rx) = conflated::<u32>();
        drop(tx);

        assert!(rx.recv_timeout(Duration::from_millis(20)).is_none());
    }
}
