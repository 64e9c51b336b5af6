//! Differ: The producer-facing entry point of the pipeline.
//!
//! [`AsyncListDiffer`] accepts new sequences from any thread, conflates
//! bursts, and keeps a display in step with the latest one. It spawns two
//! actors: the serializer (owns the state and the display) and the diff
//! worker.

use super::cancel::CancelToken;
use super::mailbox::{self, MailboxSender};
use super::messages::{CommitFn, Envelope, Request};
use super::serializer::Serializer;
use super::stats::{DifferStats, Progress};
use super::store::{CurrentListListener, Published, StateStore};
use super::worker::DiffWorker;
use crate::diff::ItemComparator;
use crate::display::ListUpdateCallback;
use crate::sequence::Sequence;
use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Configuration for a differ.
#[derive(Debug, Clone)]
pub struct DifferConfig {
    /// Report reordered items as moves instead of remove + insert.
    pub detect_moves: bool,
    /// How often blocked actors wake up to check for cancellation.
    pub poll_interval: Duration,
    /// Prefix for the actor thread names.
    pub thread_name: String,
}

impl Default for DifferConfig {
    fn default() -> Self {
        Self {
            detect_moves: true,
            poll_interval: Duration::from_millis(16),
            thread_name: "flywheel-list".to_string(),
        }
    }
}

/// Collects the collaborators of a differ before spawning it.
pub struct DifferBuilder<T, C>
where
    C: ItemComparator<T>,
{
    display: Box<dyn ListUpdateCallback<C::Payload> + Send>,
    comparator: C,
    config: DifferConfig,
    cancel: CancelToken,
    listeners: Vec<Box<dyn CurrentListListener<T>>>,
}

impl<T, C> DifferBuilder<T, C>
where
    T: Send + Sync + 'static,
    C: ItemComparator<T> + 'static,
{
    /// Use a custom configuration.
    #[must_use]
    pub fn config(mut self, config: DifferConfig) -> Self {
        self.config = config;
        self
    }

    /// Bind the differ to an existing cancellation scope.
    #[must_use]
    pub fn cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Observe every committed change of the displayed sequence.
    #[must_use]
    pub fn listener(mut self, listener: impl CurrentListListener<T> + 'static) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Spawn the actors and start accepting updates.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS fails to spawn either actor thread.
    pub fn spawn(self) -> io::Result<AsyncListDiffer<T>> {
        let Self {
            display,
            comparator,
            config,
            cancel,
            listeners,
        } = self;

        let (inbox, receiver) = mailbox::conflated();
        let published = Published::new();
        let progress = Arc::new(Progress::default());
        let worker = DiffWorker::spawn(format!("{}-diff", config.thread_name))?;

        let serializer = Serializer {
            store: StateStore::new(published.clone(), display, listeners),
            worker,
            comparator: Arc::new(comparator),
            cancel: cancel.clone(),
            progress: Arc::clone(&progress),
            detect_moves: config.detect_moves,
            poll_interval: config.poll_interval,
        };
        let handle = serializer.spawn(receiver, format!("{}-serializer", config.thread_name))?;

        Ok(AsyncListDiffer {
            inbox,
            published,
            progress,
            cancel,
            handle: Some(handle),
        })
    }
}

/// Keeps a display in step with the latest submitted sequence.
///
/// Every method takes `&self` and is safe to call from any thread.
///
/// ```rust,ignore
/// use flywheel_list::{display_channel, AsyncListDiffer, EqComparator, Sequence};
///
/// let (display, rows) = display_channel();
/// let differ = AsyncListDiffer::builder(display, EqComparator).spawn()?;
///
/// differ.update(Some(Sequence::from(vec!["a", "b", "c"])));
/// differ.update(Some(Sequence::from(vec!["a", "c", "d"])));
///
/// // On the display thread:
/// rows.drain_into(&mut my_row_widget);
/// ```
pub struct AsyncListDiffer<T> {
    inbox: MailboxSender<T>,
    published: Published<T>,
    progress: Arc<Progress>,
    cancel: CancelToken,
    /// Handle to the serializer thread.
    handle: Option<JoinHandle<()>>,
}

impl<T> AsyncListDiffer<T> {
    /// Start building a differ for `display`, comparing items with `comparator`.
    pub fn builder<C, D>(display: D, comparator: C) -> DifferBuilder<T, C>
    where
        C: ItemComparator<T> + 'static,
        D: ListUpdateCallback<C::Payload> + Send + 'static,
    {
        DifferBuilder {
            display: Box::new(display),
            comparator,
            config: DifferConfig::default(),
            cancel: CancelToken::new(),
            listeners: Vec::new(),
        }
    }

    /// Display `seq` next, or clear the display for `None`.
    pub fn update(&self, seq: Option<Sequence<T>>) {
        self.post(Request::from_update(seq), None);
    }

    /// Like [`update`](Self::update), running `on_commit` once the update is applied.
    ///
    /// `on_commit` runs on the serializer thread. It is dropped without
    /// running if a newer request supersedes this one, if the diff fails,
    /// or if the differ is cancelled first.
    pub fn update_with_commit(
        &self,
        seq: Option<Sequence<T>>,
        on_commit: impl FnOnce() + Send + 'static,
    ) {
        self.post(Request::from_update(seq), Some(Box::new(on_commit)));
    }

    /// Recompute change payloads for the displayed sequence.
    pub fn request_payload_refresh(&self) {
        self.post(Request::RefreshPayloads, None);
    }

    /// Submit a raw request.
    pub fn submit(&self, request: Request<T>) {
        self.post(request, None);
    }

    fn post(&self, request: Request<T>, on_commit: Option<CommitFn>) {
        if self.cancel.is_cancelled() {
            log::trace!("ignoring {} after cancellation", request.kind());
            return;
        }

        let generation = self.progress.next_generation();
        log::trace!("submitting {} #{generation}", request.kind());

        let envelope = Envelope {
            request,
            generation,
            on_commit,
        };
        let displaced = self.inbox.post(envelope);
        if displaced > 0 {
            self.progress.record_conflated(displaced);
        }
    }

    /// The most recently committed sequence (empty if nothing is displayed).
    pub fn current(&self) -> Sequence<T> {
        self.published.get()
    }

    /// Snapshot of the pipeline counters.
    pub fn stats(&self) -> DifferStats {
        self.progress.snapshot()
    }

    /// Wait until every submitted request has been processed or superseded.
    ///
    /// Returns `false` on timeout or if the differ was cancelled.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        self.progress.wait_idle(timeout, || self.cancel.is_cancelled())
    }

    /// Stop processing. Requests in flight are dropped without reaching the display.
    pub fn cancel(&self) {
        self.cancel.cancel();
        self.progress.wake();
    }

    /// Check whether the differ's cancellation scope was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// The cancellation scope this differ is bound to.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Cancel, wait for the serializer to stop and release the display.
    pub fn detach(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.cancel();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("serializer thread panicked");
            }
        }
    }
}

impl<T> Drop for AsyncListDiffer<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
