//! Sequence: Immutable, shared snapshot of the items a display shows.
//!
//! A [`Sequence`] is published once and never mutated afterwards. Cloning is
//! a reference-count bump, so snapshots can be handed to the diff worker and
//! back to producers without copying items.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// An ordered, immutable list of items.
///
/// Two sequences can be compared by identity with [`Sequence::ptr_eq`].
/// The differ uses that as its "nothing changed" fast path.
pub struct Sequence<T> {
    items: Arc<[T]>,
}

impl<T> Sequence<T> {
    /// Create an empty sequence.
    pub fn empty() -> Self {
        Self {
            items: Arc::from(Vec::new()),
        }
    }

    /// Check whether two sequences are the same published snapshot.
    ///
    /// Content-equal sequences built separately are not identical.
    #[inline]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.items, &b.items)
    }

    /// Borrow the items as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Copy the items into a fresh `Vec`.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items.to_vec()
    }
}

impl<T> Clone for Sequence<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<T> Default for Sequence<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Deref for Sequence<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T> From<Vec<T>> for Sequence<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            items: Arc::from(items),
        }
    }
}

impl<T> FromIterator<T> for Sequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<T: fmt::Debug> fmt::Debug for Sequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for Sequence<T> {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other) || self.items[..] == other.items[..]
    }
}

impl<T: Eq> Eq for Sequence<T> {}

impl<'a, T> IntoIterator for &'a Sequence<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_is_identical() {
        let a = Sequence::from(vec![1, 2, 3]);
        let b = a.clone();

        assert!(Sequence::ptr_eq(&a, &b));
        assert_eq!(b.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_equal_content_is_not_identical() {
        let a = Sequence::from(vec!['a', 'b']);
        let b: Sequence<char> = "ab".chars().collect();

        assert_eq!(a, b);
        assert!(!Sequence::ptr_eq(&a, &b));
    }

    #[test]
    fn test_empty() {
        let empty = Sequence::<u8>::empty();

        assert!(empty.is_empty());
        assert_eq!(empty.len(), 0);
        assert_eq!(empty, Sequence::default());
    }
}
