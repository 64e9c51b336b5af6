//! Item comparators: how the differ decides what changed.

use std::marker::PhantomData;

/// Decides identity and content equality between an old and a new item.
///
/// Implementations must be pure: the differ may call them from its
/// background worker thread, in any order, any number of times.
pub trait ItemComparator<T>: Send + Sync {
    /// Description of an in-place change, forwarded with change notifications.
    type Payload: Send + 'static;

    /// Do both items represent the same logical entry?
    fn are_items_same(&self, old: &T, new: &T) -> bool;

    /// Do both items render identically?
    ///
    /// Only called for pairs that are already the same item.
    fn are_contents_same(&self, old: &T, new: &T) -> bool;

    /// Describe the difference between two same items with different contents.
    fn change_payload(&self, _old: &T, _new: &T) -> Option<Self::Payload> {
        None
    }
}

/// Compares items with `PartialEq` for both identity and content.
///
/// Since equal items are always the same content, this comparator never
/// produces change notifications: every edit is an insert, remove or move.
#[derive(Debug, Clone, Copy, Default)]
pub struct EqComparator;

impl<T: PartialEq> ItemComparator<T> for EqComparator {
    type Payload = ();

    fn are_items_same(&self, old: &T, new: &T) -> bool {
        old == new
    }

    fn are_contents_same(&self, old: &T, new: &T) -> bool {
        old == new
    }
}

/// Identifies items by a key and compares their content with `PartialEq`.
pub struct KeyComparator<T, K, F> {
    key: F,
    _marker: PhantomData<fn(&T) -> K>,
}

impl<T, K, F> KeyComparator<T, K, F>
where
    F: Fn(&T) -> K,
{
    /// Create a comparator that identifies items by `key`.
    pub const fn new(key: F) -> Self {
        Self {
            key,
            _marker: PhantomData,
        }
    }
}

impl<T, K, F> ItemComparator<T> for KeyComparator<T, K, F>
where
    T: PartialEq,
    K: PartialEq,
    F: Fn(&T) -> K + Send + Sync,
{
    type Payload = ();

    fn are_items_same(&self, old: &T, new: &T) -> bool {
        (self.key)(old) == (self.key)(new)
    }

    fn are_contents_same(&self, old: &T, new: &T) -> bool {
        old == new
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Row {
        id: u32,
        label: &'static str,
    }

    #[test]
    fn test_eq_comparator() {
        let cmp = EqComparator;

        assert!(cmp.are_items_same(&1, &1));
        assert!(!cmp.are_items_same(&1, &2));
        assert!(ItemComparator::<i32>::change_payload(&cmp, &1, &2).is_none());
    }

    #[test]
    fn test_key_comparator_splits_identity_and_content() {
        let cmp = KeyComparator::new(|row: &Row| row.id);
        let old = Row { id: 7, label: "draft" };
        let new = Row { id: 7, label: "final" };

        assert!(cmp.are_items_same(&old, &new));
        assert!(!cmp.are_contents_same(&old, &new));
    }
}
