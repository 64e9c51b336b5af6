//! Edit operations and the scripts built from them.

use crate::display::ListUpdateCallback;

/// A single edit applied to a displayed list.
///
/// Positions are expressed against the list as it looks after every
/// earlier operation of the same script has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp<P> {
    /// `count` new items appear starting at `position`.
    Insert {
        /// First inserted position.
        position: usize,
        /// Number of inserted items.
        count: usize,
    },
    /// `count` items starting at `position` disappear.
    Remove {
        /// First removed position.
        position: usize,
        /// Number of removed items.
        count: usize,
    },
    /// The item at `from` is taken out and reinserted so that it ends up at `to`.
    Move {
        /// Position before the move.
        from: usize,
        /// Position after the move.
        to: usize,
    },
    /// `count` items starting at `position` changed content in place.
    Change {
        /// First changed position.
        position: usize,
        /// Number of changed items.
        count: usize,
        /// Comparator-supplied description of the change.
        payload: Option<P>,
    },
}

impl<P> EditOp<P> {
    /// Forward this operation to a display.
    pub fn dispatch_to<D>(self, display: &mut D)
    where
        D: ListUpdateCallback<P> + ?Sized,
    {
        match self {
            Self::Insert { position, count } => display.on_inserted(position, count),
            Self::Remove { position, count } => display.on_removed(position, count),
            Self::Move { from, to } => display.on_moved(from, to),
            Self::Change {
                position,
                count,
                payload,
            } => display.on_changed(position, count, payload),
        }
    }
}

/// An ordered list of [`EditOp`]s that turns one sequence into another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditScript<P> {
    ops: Vec<EditOp<P>>,
}

impl<P> Default for EditScript<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> EditScript<P> {
    /// Create an empty script.
    pub const fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Build a script from already ordered operations.
    pub const fn from_ops(ops: Vec<EditOp<P>>) -> Self {
        Self { ops }
    }

    /// The operations in application order.
    pub fn ops(&self) -> &[EditOp<P>] {
        &self.ops
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Check if the script does nothing.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Take the operations out of the script.
    pub fn into_ops(self) -> Vec<EditOp<P>> {
        self.ops
    }

    pub(crate) fn push(&mut self, op: EditOp<P>) {
        self.ops.push(op);
    }

    /// Forward every operation, in order, to a display.
    pub fn dispatch_to<D>(self, display: &mut D)
    where
        D: ListUpdateCallback<P> + ?Sized,
    {
        for op in self.ops {
            op.dispatch_to(display);
        }
    }

    /// Replay the script against a local copy of the displayed list.
    ///
    /// Inserted slots are produced by `fill(position)`, where `position` is
    /// the slot's index at the time of insertion. Changes do not touch the
    /// list. Useful to check that a script lands on the expected result.
    ///
    /// # Panics
    ///
    /// Panics if an operation is out of bounds for `list`.
    pub fn apply_to<X>(&self, list: &mut Vec<X>, mut fill: impl FnMut(usize) -> X) {
        for op in &self.ops {
            match *op {
                EditOp::Insert { position, count } => {
                    let tail = list.split_off(position);
                    list.extend((position..position + count).map(&mut fill));
                    list.extend(tail);
                }
                EditOp::Remove { position, count } => {
                    list.drain(position..position + count);
                }
                EditOp::Move { from, to } => {
                    let item = list.remove(from);
                    list.insert(to, item);
                }
                EditOp::Change { .. } => {}
            }
        }
    }
}

impl<P> IntoIterator for EditScript<P> {
    type Item = EditOp<P>;
    type IntoIter = std::vec::IntoIter<EditOp<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}
