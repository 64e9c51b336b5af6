//! Serializer Actor: The single consumer of update requests.
//!
//! This thread owns the [`StateStore`] and is the only one that talks to the
//! display. Requests are handled one at a time: a diff is handed to the
//! [`DiffWorker`] and the thread waits for its script before touching the
//! store, so dispatches never interleave.

use super::cancel::CancelToken;
use super::mailbox::MailboxReceiver;
use super::messages::{Envelope, Outcome, Request};
use super::stats::Progress;
use super::store::StateStore;
use super::worker::DiffWorker;
use crate::diff::{compute_diff, DiffError, EditScript, ItemComparator};
use crate::sequence::Sequence;
use crossbeam_channel::RecvTimeoutError;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Everything the serializer thread owns.
pub(crate) struct Serializer<T, C>
where
    C: ItemComparator<T>,
{
    pub store: StateStore<T, C::Payload>,
    pub worker: DiffWorker,
    pub comparator: Arc<C>,
    pub cancel: CancelToken,
    pub progress: Arc<Progress>,
    pub detect_moves: bool,
    pub poll_interval: Duration,
}

impl<T, C> Serializer<T, C>
where
    T: Send + Sync + 'static,
    C: ItemComparator<T> + 'static,
{
    /// Spawn the serializer thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS fails to spawn the thread.
    pub fn spawn(self, inbox: MailboxReceiver<T>, name: String) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(name)
            .spawn(move || self.run_loop(&inbox))
    }

    /// Main consumer loop.
    fn run_loop(mut self, inbox: &MailboxReceiver<T>) {
        loop {
            // Check for cancellation
            if self.cancel.is_cancelled() {
                break;
            }

            let Some(envelope) = inbox.recv_timeout(self.poll_interval) else {
                continue;
            };

            if self.cancel.is_cancelled() {
                log::debug!(
                    "dropping {} #{}: cancelled",
                    envelope.request.kind(),
                    envelope.generation
                );
                break;
            }

            if !self.handle(envelope) {
                break;
            }
        }

        log::debug!("serializer stopped");
        self.progress.wake();
    }

    /// Process one envelope. Returns `false` once cancellation was observed.
    fn handle(&mut self, envelope: Envelope<T>) -> bool {
        let Envelope {
            request,
            generation,
            on_commit,
        } = envelope;
        let kind = request.kind();

        match self.process(request) {
            Ok(Outcome::Cancelled) => {
                log::debug!("{kind} #{generation} cancelled before dispatch");
                return false;
            }
            Ok(outcome) => {
                if outcome == Outcome::Committed {
                    self.progress.record_commit();
                    log::debug!("{kind} #{generation} committed");
                } else {
                    self.progress.record_unchanged();
                    log::debug!("{kind} #{generation} left the display unchanged");
                }
                if let Some(on_commit) = on_commit {
                    on_commit();
                }
            }
            Err(err) => {
                self.progress.record_failure();
                log::error!("{kind} #{generation} failed, display left unchanged: {err}");
            }
        }

        self.progress.complete(generation);
        true
    }

    fn process(&mut self, request: Request<T>) -> Result<Outcome, DiffError> {
        match request {
            Request::Clear => {
                let Some(count) = self.store.current().map(|seq| seq.len()) else {
                    return Ok(Outcome::Unchanged);
                };
                self.store.apply_clear(count);
                Ok(Outcome::Committed)
            }
            Request::Replace(new) => match self.store.current() {
                None => {
                    self.store.apply_insert_all(new);
                    Ok(Outcome::Committed)
                }
                Some(old) if Sequence::ptr_eq(old, &new) => Ok(Outcome::Unchanged),
                Some(old) => {
                    let old = old.clone();
                    self.diff_and_apply(old, new)
                }
            },
            Request::RefreshPayloads => match self.store.current() {
                None => Ok(Outcome::Unchanged),
                Some(current) => {
                    let current = current.clone();
                    self.diff_and_apply(current.clone(), current)
                }
            },
        }
    }

    fn diff_and_apply(&mut self, old: Sequence<T>, new: Sequence<T>) -> Result<Outcome, DiffError> {
        let refresh = Sequence::ptr_eq(&old, &new);
        let Some(script) = self.compute(old, new.clone())? else {
            return Ok(Outcome::Cancelled);
        };
        // The diff may have finished after the owner went away
        if self.cancel.is_cancelled() {
            return Ok(Outcome::Cancelled);
        }
        // A refresh that found no stale content has nothing to apply
        if refresh && script.is_empty() {
            return Ok(Outcome::Unchanged);
        }
        self.store.apply_edit_script(new, script);
        Ok(Outcome::Committed)
    }

    /// Run the diff on the worker and wait for it. `None` means cancelled.
    fn compute(
        &self,
        old: Sequence<T>,
        new: Sequence<T>,
    ) -> Result<Option<EditScript<C::Payload>>, DiffError> {
        let comparator = Arc::clone(&self.comparator);
        let detect_moves = self.detect_moves;
        let reply = self
            .worker
            .submit(move || compute_diff(&old, &new, &*comparator, detect_moves))?;

        loop {
            match reply.recv_timeout(self.poll_interval) {
                Ok(result) => {
                    let script = result?;
                    self.progress.record_diff();
                    return Ok(Some(script));
                }
                Err(RecvTimeoutError::Timeout) => {
                    if self.cancel.is_cancelled() {
                        return Ok(None);
                    }
                }
                Err(RecvTimeoutError::Disconnected) => return Err(DiffError::WorkerGone),
            }
        }
    }
}
