//! Bridge between an [`ItemComparator`] and the index-based diff engine.

use super::comparator::ItemComparator;
use super::error::DiffError;

/// Position-based view over two slices and a comparator.
///
/// The engine only ever asks about valid positions. Lookups that come back
/// empty are still handled: two absent items are the same, one absent item
/// is a broken engine invariant and fails the diff.
pub struct ItemCallback<'a, T, C> {
    old: &'a [T],
    new: &'a [T],
    comparator: &'a C,
}

impl<'a, T, C> ItemCallback<'a, T, C>
where
    C: ItemComparator<T>,
{
    /// Wrap two slices and a comparator.
    pub const fn new(old: &'a [T], new: &'a [T], comparator: &'a C) -> Self {
        Self {
            old,
            new,
            comparator,
        }
    }

    /// Length of the old slice.
    pub const fn old_len(&self) -> usize {
        self.old.len()
    }

    /// Length of the new slice.
    pub const fn new_len(&self) -> usize {
        self.new.len()
    }

    fn pair(&self, old_position: usize, new_position: usize) -> Result<Option<(&T, &T)>, DiffError> {
        match (self.old.get(old_position), self.new.get(new_position)) {
            (Some(old), Some(new)) => Ok(Some((old, new))),
            (None, None) => Ok(None),
            (old, _) => Err(DiffError::AbsentItem {
                old_position,
                new_position,
                old_missing: old.is_none(),
            }),
        }
    }

    /// Same logical item at both positions?
    pub fn items_same(&self, old_position: usize, new_position: usize) -> Result<bool, DiffError> {
        Ok(self
            .pair(old_position, new_position)?
            .is_none_or(|(old, new)| self.comparator.are_items_same(old, new)))
    }

    /// Same rendered content at both positions?
    pub fn contents_same(&self, old_position: usize, new_position: usize) -> Result<bool, DiffError> {
        Ok(self
            .pair(old_position, new_position)?
            .is_none_or(|(old, new)| self.comparator.are_contents_same(old, new)))
    }

    /// Change payload for a pair already known to differ in content.
    pub fn payload(
        &self,
        old_position: usize,
        new_position: usize,
    ) -> Result<Option<C::Payload>, DiffError> {
        Ok(self
            .pair(old_position, new_position)?
            .and_then(|(old, new)| self.comparator.change_payload(old, new)))
    }
}
