//! State Store: The displayed sequence and the dispatcher that changes it.
//!
//! Only the serializer thread holds a [`StateStore`]. Each `apply_*` call
//! swaps the authoritative sequence, publishes a read-only snapshot for
//! other threads and forwards the matching notifications to the display.

use crate::diff::EditScript;
use crate::display::ListUpdateCallback;
use crate::sequence::Sequence;
use std::sync::{Arc, PoisonError, RwLock};

/// Observes every committed change of the displayed sequence.
///
/// Called on the serializer thread after the display has been notified.
pub trait CurrentListListener<T>: Send {
    /// The displayed sequence went from `previous` to `current`.
    fn on_current_list_changed(&mut self, previous: &Sequence<T>, current: &Sequence<T>);
}

impl<T, F> CurrentListListener<T> for F
where
    F: FnMut(&Sequence<T>, &Sequence<T>) + Send,
{
    fn on_current_list_changed(&mut self, previous: &Sequence<T>, current: &Sequence<T>) {
        self(previous, current);
    }
}

/// Read-only snapshot shared with producers.
pub(crate) struct Published<T> {
    snapshot: Arc<RwLock<Sequence<T>>>,
}

impl<T> Published<T> {
    pub fn new() -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(Sequence::empty())),
        }
    }

    /// The most recently committed sequence.
    pub fn get(&self) -> Sequence<T> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, seq: Sequence<T>) -> Sequence<T> {
        let mut guard = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, seq)
    }
}

impl<T> Clone for Published<T> {
    fn clone(&self) -> Self {
        Self {
            snapshot: Arc::clone(&self.snapshot),
        }
    }
}

/// Authoritative displayed state plus the display it drives.
pub(crate) struct StateStore<T, P> {
    /// `None` until something is displayed, and again after a clear.
    current: Option<Sequence<T>>,
    published: Published<T>,
    display: Box<dyn ListUpdateCallback<P> + Send>,
    listeners: Vec<Box<dyn CurrentListListener<T>>>,
}

impl<T, P> StateStore<T, P> {
    pub fn new(
        published: Published<T>,
        display: Box<dyn ListUpdateCallback<P> + Send>,
        listeners: Vec<Box<dyn CurrentListListener<T>>>,
    ) -> Self {
        Self {
            current: None,
            published,
            display,
            listeners,
        }
    }

    /// The displayed sequence, if any.
    pub const fn current(&self) -> Option<&Sequence<T>> {
        self.current.as_ref()
    }

    /// Stop displaying anything; `count` is the length being removed.
    pub fn apply_clear(&mut self, count: usize) {
        let previous = self.commit(None);
        if count > 0 {
            self.display.on_removed(0, count);
        }
        self.notify_listeners(&previous);
    }

    /// Display `seq` when nothing was displayed before.
    pub fn apply_insert_all(&mut self, seq: Sequence<T>) {
        let count = seq.len();
        let previous = self.commit(Some(seq));
        if count > 0 {
            self.display.on_inserted(0, count);
        }
        self.notify_listeners(&previous);
    }

    /// Display `seq`, reaching it from the current sequence through `script`.
    pub fn apply_edit_script(&mut self, seq: Sequence<T>, script: EditScript<P>) {
        let previous = self.commit(Some(seq));
        script.dispatch_to(&mut *self.display);
        self.notify_listeners(&previous);
    }

    fn commit(&mut self, next: Option<Sequence<T>>) -> Sequence<T> {
        let snapshot = next.clone().unwrap_or_default();
        self.current = next;
        self.published.set(snapshot)
    }

    fn notify_listeners(&mut self, previous: &Sequence<T>) {
        if self.listeners.is_empty() {
            return;
        }
        let current = self.published.get();
        for listener in &mut self.listeners {
            listener.on_current_list_changed(previous, &current);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{EditOp, EditScript};
    use std::sync::Mutex;

    type Log = Arc<Mutex<Vec<EditOp<()>>>>;

    struct Recorder(Log);

    impl ListUpdateCallback<()> for Recorder {
        fn on_inserted(&mut self, position: usize, count: usize) {
            self.0.lock().unwrap().on_inserted(position, count);
        }

        fn on_removed(&mut self, position: usize, count: usize) {
            self.0.lock().unwrap().on_removed(position, count);
        }

        fn on_moved(&mut self, from: usize, to: usize) {
            self.0.lock().unwrap().on_moved(from, to);
        }

        fn on_changed(&mut self, position: usize, count: usize, payload: Option<()>) {
            self.0.lock().unwrap().on_changed(position, count, payload);
        }
    }

    fn store() -> (StateStore<char, ()>, Published<char>, Log) {
        let log = Log::default();
        let published = Published::new();
        let store = StateStore::new(
            published.clone(),
            Box::new(Recorder(Arc::clone(&log))),
            Vec::new(),
        );
        (store, published, log)
    }

    #[test]
    fn test_insert_all_publishes_and_notifies() {
        let (mut store, published, log) = store();
        let seq = Sequence::from(vec!['a', 'b']);

        store.apply_insert_all(seq.clone());

        assert!(Sequence::ptr_eq(&published.get(), &seq));
        assert_eq!(
            log.lock().unwrap().as_slice(),
            &[EditOp::Insert {
                position: 0,
                count: 2
            }]
        );
    }

    #[test]
    fn test_clear_resets_to_empty() {
        let (mut store, published, log) = store();
        store.apply_insert_all(Sequence::from(vec!['a', 'b', 'c']));

        store.apply_clear(3);

        assert!(store.current().is_none());
        assert!(published.get().is_empty());
        assert_eq!(
            log.lock().unwrap().last(),
            Some(&EditOp::Remove {
                position: 0,
                count: 3
            })
        );
    }

    #[test]
    fn test_empty_bulk_ops_are_silent() {
        let (mut store, _published, log) = store();

        store.apply_insert_all(Sequence::empty());
        store.apply_clear(0);

        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_listeners_see_previous_and_current() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let listener = move |previous: &Sequence<char>, current: &Sequence<char>| {
            sink.lock().unwrap().push((previous.to_vec(), current.to_vec()));
        };
        let listeners: Vec<Box<dyn CurrentListListener<char>>> = vec![Box::new(listener)];
        let mut store: StateStore<char, ()> =
            StateStore::new(Published::new(), Box::new(Vec::<EditOp<()>>::new()), listeners);

        store.apply_insert_all(Sequence::from(vec!['a']));
        store.apply_edit_script(
            Sequence::from(vec!['a', 'b']),
            EditScript::from_ops(vec![EditOp::Insert {
                position: 1,
                count: 1,
            }]),
        );

        assert_eq!(
            seen.lock().unwrap().as_slice(),
            &[(vec![], vec!['a']), (vec!['a'], vec!['a', 'b'])]
        );
    }
}
