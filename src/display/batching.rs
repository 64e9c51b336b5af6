//! Batching callback: Merge adjacent notifications of the same kind.
//!
//! Hand-built update sequences (e.g. one insert per appended row) often
//! arrive as many tiny notifications. Buffering the last one and merging
//! contiguous follow-ups keeps displays from redrawing row by row.

use super::ListUpdateCallback;
use crate::diff::EditOp;

/// Buffers one notification and merges contiguous follow-ups into it.
///
/// Call [`flush`](Self::flush) when the batch is over. Dropping the
/// callback discards a pending notification.
pub struct BatchingCallback<P, D> {
    inner: D,
    pending: Option<EditOp<P>>,
}

impl<P, D> BatchingCallback<P, D>
where
    D: ListUpdateCallback<P>,
{
    /// Wrap a display.
    pub const fn new(inner: D) -> Self {
        Self {
            inner,
            pending: None,
        }
    }

    /// Forward the pending notification, if any.
    pub fn flush(&mut self) {
        if let Some(op) = self.pending.take() {
            op.dispatch_to(&mut self.inner);
        }
    }

    /// Borrow the wrapped display.
    pub const fn inner(&self) -> &D {
        &self.inner
    }

    /// Flush and return the wrapped display.
    pub fn into_inner(mut self) -> D {
        self.flush();
        let Self { inner, .. } = self;
        inner
    }

    fn replace_pending(&mut self, op: EditOp<P>) {
        self.flush();
        self.pending = Some(op);
    }
}

impl<P, D> ListUpdateCallback<P> for BatchingCallback<P, D>
where
    D: ListUpdateCallback<P>,
{
    fn on_inserted(&mut self, position: usize, count: usize) {
        if let Some(EditOp::Insert {
            position: last,
            count: last_count,
        }) = self.pending.as_mut()
        {
            if position >= *last && position <= *last + *last_count {
                *last_count += count;
                return;
            }
        }
        self.replace_pending(EditOp::Insert { position, count });
    }

    fn on_removed(&mut self, position: usize, count: usize) {
        if let Some(EditOp::Remove {
            position: last,
            count: last_count,
        }) = self.pending.as_mut()
        {
            if *last >= position && *last <= position + count {
                *last_count += count;
                *last = position;
                return;
            }
        }
        self.replace_pending(EditOp::Remove { position, count });
    }

    fn on_moved(&mut self, from: usize, to: usize) {
        self.flush();
        self.inner.on_moved(from, to);
    }

    fn on_changed(&mut self, position: usize, count: usize, payload: Option<P>) {
        if payload.is_none() {
            if let Some(EditOp::Change {
                position: last,
                count: last_count,
                payload: None,
            }) = self.pending.as_mut()
            {
                let last_end = *last + *last_count;
                let end = position + count;
                if position <= last_end && end >= *last {
                    *last = (*last).min(position);
                    *last_count = last_end.max(end) - *last;
                    return;
                }
            }
        }
        self.replace_pending(EditOp::Change {
            position,
            count,
            payload,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_merge_into_one_insert() {
        let mut batch = BatchingCallback::new(Vec::<EditOp<()>>::new());

        batch.on_inserted(3, 1);
        batch.on_inserted(4, 1);
        batch.on_inserted(5, 2);

        assert_eq!(
            batch.into_inner(),
            vec![EditOp::Insert {
                position: 3,
                count: 4
            }]
        );
    }

    #[test]
    fn test_repeated_removals_at_same_position_merge() {
        let mut batch = BatchingCallback::new(Vec::<EditOp<()>>::new());

        batch.on_removed(2, 1);
        batch.on_removed(2, 1);
        batch.on_removed(1, 1);

        assert_eq!(
            batch.into_inner(),
            vec![EditOp::Remove {
                position: 1,
                count: 3
            }]
        );
    }

    #[test]
    fn test_kind_switch_flushes() {
        let mut batch = BatchingCallback::new(Vec::<EditOp<()>>::new());

        batch.on_inserted(0, 1);
        batch.on_removed(4, 1);
        batch.on_moved(0, 1);
        assert_eq!(batch.inner().len(), 3);

        batch.flush();
        assert_eq!(
            batch.inner().as_slice(),
            &[
                EditOp::Insert {
                    position: 0,
                    count: 1
                },
                EditOp::Remove {
                    position: 4,
                    count: 1
                },
                EditOp::Move { from: 0, to: 1 },
            ]
        );
    }

    #[test]
    fn test_overlapping_changes_merge_without_payload() {
        let mut batch = BatchingCallback::new(Vec::<EditOp<u8>>::new());

        batch.on_changed(2, 2, None);
        batch.on_changed(4, 1, None);
        batch.on_changed(1, 1, None);
        batch.on_changed(2, 1, Some(9));

        assert_eq!(
            batch.into_inner(),
            vec![
                EditOp::Change {
                    position: 1,
                    count: 4,
                    payload: None
                },
                EditOp::Change {
                    position: 2,
                    count: 1,
                    payload: Some(9)
                },
            ]
        );
    }
}
