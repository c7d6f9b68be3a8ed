//! `RankSet`: a unique-element ordered set over the core tree.
//!
//! Elements are tree keys with a `()` payload; the façade hides the payload
//! and speaks in elements and ranks.

use std::ops::RangeBounds;

use crate::construction::DEFAULT_ORDER;
use crate::error::TreeResult;
use crate::iter::{Keys, Range};
use crate::types::RankTree;

/// Ordered set with O(log n) access by rank.
///
/// # Examples
///
/// ```
/// use ranktree::RankSet;
///
/// let mut set = RankSet::new();
/// set.insert(30);
/// set.insert(10);
/// set.insert(20);
///
/// assert_eq!(set.get_by_rank(1), Some(&20));
/// assert_eq!(set.rank_of(&30), Some(2));
/// ```
#[derive(Debug)]
pub struct RankSet<K> {
    tree: RankTree<K, ()>,
}

impl<K> Default for RankSet<K> {
    fn default() -> Self {
        Self {
            tree: RankTree::default(),
        }
    }
}

impl<K: Ord + Clone> RankSet<K> {
    /// Create an empty set with the default page size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty set with an explicit fan-out bound.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrder`](crate::Error::InvalidOrder) for an
    /// order outside the supported range.
    pub fn with_order(order: usize) -> TreeResult<Self> {
        Ok(Self {
            tree: RankTree::new(order)?,
        })
    }

    /// Build a set from strictly ascending elements.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsortedBulkLoad`](crate::Error::UnsortedBulkLoad)
    /// if the input is not strictly ascending.
    pub fn from_sorted_iter<I>(elements: I) -> TreeResult<Self>
    where
        I: IntoIterator<Item = K>,
    {
        Ok(Self {
            tree: RankTree::from_sorted_iter(
                DEFAULT_ORDER,
                elements.into_iter().map(|element| (element, ())),
            )?,
        })
    }

    /// Insert an element. Returns true if it was not already present.
    pub fn insert(&mut self, element: K) -> bool {
        self.tree.try_insert(element, ()).is_ok()
    }

    /// Remove an element. Returns true if it was present.
    pub fn remove(&mut self, element: &K) -> bool {
        self.tree.remove(element).is_some()
    }

    /// Remove and return the element at `rank`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RankOutOfBounds`](crate::Error::RankOutOfBounds) if
    /// `rank >= len()`.
    pub fn remove_by_rank(&mut self, rank: usize) -> TreeResult<K> {
        self.tree.remove_by_rank(rank).map(|(element, ())| element)
    }

    /// Returns true if `element` is present.
    pub fn contains(&self, element: &K) -> bool {
        self.tree.contains_key(element)
    }

    /// Element at `rank` (zero-based position in order).
    pub fn get_by_rank(&self, rank: usize) -> Option<&K> {
        self.tree.get_by_rank(rank).map(|(element, _)| element)
    }

    /// Rank of `element`, or `None` if absent.
    pub fn rank_of(&self, element: &K) -> Option<usize> {
        self.tree.rank_of_key(element)
    }

    /// Number of elements strictly less than `element`.
    pub fn rank_lower_bound(&self, element: &K) -> usize {
        self.tree.rank_lower_bound(element)
    }

    /// Smallest element.
    pub fn first(&self) -> Option<&K> {
        self.tree.first().map(|(element, _)| element)
    }

    /// Largest element.
    pub fn last(&self) -> Option<&K> {
        self.tree.last().map(|(element, _)| element)
    }

    /// Remove and return the smallest element.
    pub fn pop_first(&mut self) -> Option<K> {
        self.tree.pop_first().map(|(element, ())| element)
    }

    /// Remove and return the largest element.
    pub fn pop_last(&mut self) -> Option<K> {
        self.tree.pop_last().map(|(element, ())| element)
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns true if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Remove every element, keeping the configured order.
    pub fn clear(&mut self) {
        self.tree.clear()
    }

    /// Iterate elements in order.
    pub fn iter(&self) -> Keys<'_, K, ()> {
        self.tree.keys()
    }

    /// Iterate the elements falling in `range`.
    pub fn range<R>(&self, range: R) -> SetRange<'_, K>
    where
        R: RangeBounds<K>,
    {
        SetRange {
            inner: self.tree.range(range),
        }
    }

    /// Borrow the underlying tree.
    pub fn as_tree(&self) -> &RankTree<K, ()> {
        &self.tree
    }
}

/// Iterator over the elements of a [`RankSet`] inside a range.
pub struct SetRange<'a, K> {
    inner: Range<'a, K, ()>,
}

impl<'a, K: Ord> Iterator for SetRange<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(element, _)| element)
    }
}

impl<K: Ord + Clone> FromIterator<K> for RankSet<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = Self::new();
        for element in iter {
            set.insert(element);
        }
        set
    }
}

impl<K: Ord + Clone> Extend<K> for RankSet<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for element in iter {
            self.insert(element);
        }
    }
}

impl<'a, K: Ord + Clone> IntoIterator for &'a RankSet<K> {
    type Item = &'a K;
    type IntoIter = Keys<'a, K, ()>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_idempotent() {
        let mut set = RankSet::new();
        assert!(set.insert(5));
        assert!(!set.insert(5));
        assert_eq!(set.len(), 1);
        assert!(set.remove(&5));
        assert!(!set.remove(&5));
    }

    #[test]
    fn ranks_and_ranges() {
        let set: RankSet<i32> = (0..100).map(|i| i * 3).collect();
        assert_eq!(set.get_by_rank(10), Some(&30));
        assert_eq!(set.rank_of(&30), Some(10));
        assert_eq!(set.rank_of(&31), None);
        assert_eq!(set.rank_lower_bound(&31), 11);

        let window: Vec<i32> = set.range(10..20).copied().collect();
        assert_eq!(window, vec![12, 15, 18]);
        set.as_tree().check_invariants_detailed().unwrap();
    }

    #[test]
    fn extremes_and_pops() {
        let mut set = RankSet::from_sorted_iter(1..=5).unwrap();
        assert_eq!(set.first(), Some(&1));
        assert_eq!(set.last(), Some(&5));
        assert_eq!(set.pop_first(), Some(1));
        assert_eq!(set.pop_last(), Some(5));
        assert_eq!(set.remove_by_rank(1), Ok(3));
        let rest: Vec<i32> = set.iter().copied().collect();
        assert_eq!(rest, vec![2, 4]);
    }
}
