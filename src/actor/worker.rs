//! Diff Worker: Dedicated thread for computing edit scripts.
//!
//! Diffing is O(ND) and can take a while on long lists, so it runs here
//! instead of on the serializer thread. The worker only reads the two
//! sequences it is handed and sends the script back; it never touches the
//! displayed state.

use crate::diff::DiffError;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Handle to the worker thread.
///
/// The thread runs detached. Dropping the handle closes the job queue; a
/// job that is still running finishes in the background and its result is
/// discarded.
pub(crate) struct DiffWorker {
    /// Job queue into the worker thread.
    jobs: Sender<Job>,
}

impl DiffWorker {
    /// Spawn the worker thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS fails to spawn the thread.
    pub fn spawn(name: String) -> io::Result<Self> {
        let (jobs, queue) = unbounded::<Job>();

        thread::Builder::new()
            .name(name)
            .spawn(move || Self::run_loop(&queue))?;

        Ok(Self { jobs })
    }

    /// Queue `job` and return the channel its result arrives on.
    ///
    /// A panicking job is reported as [`DiffError::WorkerPanicked`] and
    /// leaves the worker running.
    pub fn submit<R, F>(&self, job: F) -> Result<Receiver<Result<R, DiffError>>, DiffError>
    where
        R: Send + 'static,
        F: FnOnce() -> Result<R, DiffError> + Send + 'static,
    {
        let (reply_tx, reply_rx) = bounded(1);

        let wrapped: Job = Box::new(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(job))
                .unwrap_or_else(|cause| Err(DiffError::WorkerPanicked(panic_message(&*cause))));
            // Receiver gone: the request was cancelled while we were working.
            let _ = reply_tx.send(outcome);
        });

        self.jobs.send(wrapped).map_err(|_| DiffError::WorkerGone)?;
        Ok(reply_rx)
    }

    /// Main worker loop.
    fn run_loop(queue: &Receiver<Job>) {
        while let Ok(job) = queue.recv() {
            job();
        }
        log::debug!("diff worker queue closed");
    }
}

fn panic_message(cause: &(dyn Any + Send)) -> String {
    cause
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| cause.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
