//! `RankMultimap`: an ordered multimap over the core tree.
//!
//! Duplicate keys occupy adjacent leaf slots; inserts land after existing
//! equals, so values under one key enumerate in arrival order. Ranks count
//! every occurrence.

use crate::construction::DEFAULT_ORDER;
use crate::error::TreeResult;
use crate::iter::{Iter, Range};
use crate::types::RankTree;

/// Ordered multimap with O(log n) access by rank.
///
/// # Examples
///
/// ```
/// use ranktree::RankMultimap;
///
/// let mut log = RankMultimap::new();
/// log.insert("warn", 1);
/// log.insert("error", 2);
/// log.insert("warn", 3);
///
/// assert_eq!(log.count(&"warn"), 2);
/// let warns: Vec<i32> = log.get_all(&"warn").copied().collect();
/// assert_eq!(warns, vec![1, 3]);
/// ```
#[derive(Debug)]
pub struct RankMultimap<K, V> {
    tree: RankTree<K, V>,
}

impl<K, V> Default for RankMultimap<K, V> {
    fn default() -> Self {
        Self {
            tree: RankTree::default(),
        }
    }
}

impl<K: Ord + Clone, V> RankMultimap<K, V> {
    /// Create an empty multimap with the default page size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty multimap with an explicit fan-out bound.
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

    /// Build a multimap from entries sorted by non-decreasing key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsortedBulkLoad`](crate::Error::UnsortedBulkLoad)
    /// if a key is less than its predecessor.
    pub fn from_sorted_iter<I>(entries: I) -> TreeResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Ok(Self {
            tree: RankTree::bulk_load(DEFAULT_ORDER, entries, true)?,
        })
    }

    /// Insert a pair; duplicate keys accumulate.
    pub fn insert(&mut self, key: K, value: V) {
        self.tree.insert_dup(key, value)
    }

    /// Remove the oldest occurrence of `key`, returning its value.
    pub fn remove_first(&mut self, key: &K) -> Option<V> {
        self.tree.remove(key)
    }

    /// Remove every occurrence of `key`, returning how many were removed.
    pub fn remove_all(&mut self, key: &K) -> usize {
        let mut removed = 0;
        while self.tree.remove(key).is_some() {
            removed += 1;
        }
        removed
    }

    /// Remove the entry at `rank`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RankOutOfBounds`](crate::Error::RankOutOfBounds) if
    /// `rank >= len()`.
    pub fn remove_by_rank(&mut self, rank: usize) -> TreeResult<(K, V)> {
        self.tree.remove_by_rank(rank)
    }

    /// Returns true if at least one occurrence of `key` is present.
    pub fn contains_key(&self, key: &K) -> bool {
        self.tree.contains_key(key)
    }

    /// Number of occurrences of `key`.
    pub fn count(&self, key: &K) -> usize {
        self.tree.count_key(key)
    }

    /// Iterate the values under `key` in arrival order.
    pub fn get_all(&self, key: &K) -> MultiValues<'_, K, V> {
        MultiValues {
            inner: self.tree.range(key.clone()..=key.clone()),
        }
    }

    /// Entry at `rank` (zero-based, counting every occurrence).
    pub fn get_by_rank(&self, rank: usize) -> Option<(&K, &V)> {
        self.tree.get_by_rank(rank)
    }

    /// Rank of the oldest occurrence of `key`, or `None` if absent.
    pub fn rank_of_key(&self, key: &K) -> Option<usize> {
        self.tree.rank_of_key(key)
    }

    /// Number of entries with keys strictly less than `key`.
    pub fn rank_lower_bound(&self, key: &K) -> usize {
        self.tree.rank_lower_bound(key)
    }

    /// Number of entries with keys less than or equal to `key`.
    pub fn rank_upper_bound(&self, key: &K) -> usize {
        self.tree.rank_upper_bound(key)
    }

    /// Total number of entries, counting every occurrence.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns true if the multimap is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Remove every entry, keeping the configured order.
    pub fn clear(&mut self) {
        self.tree.clear()
    }

    /// Iterate all entries in key order, equal keys in arrival order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.tree.iter()
    }

    /// Borrow the underlying tree.
    pub fn as_tree(&self) -> &RankTree<K, V> {
        &self.tree
    }
}

/// Iterator over the values stored under one key of a [`RankMultimap`].
pub struct MultiValues<'a, K, V> {
    inner: Range<'a, K, V>,
}

impl<'a, K: Ord, V> Iterator for MultiValues<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }
}

impl<K: Ord + Clone, V> FromIterator<(K, V)> for RankMultimap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<K: Ord + Clone, V> Extend<(K, V)> for RankMultimap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_accumulate_in_arrival_order() {
        let mut map = RankMultimap::new();
        for (k, v) in [(1, 'a'), (2, 'x'), (1, 'b'), (1, 'c')] {
            map.insert(k, v);
        }
        assert_eq!(map.len(), 4);
        assert_eq!(map.count(&1), 3);
        let ones: Vec<char> = map.get_all(&1).copied().collect();
        assert_eq!(ones, vec!['a', 'b', 'c']);
        map.as_tree().check_invariants_detailed().unwrap();
    }

    #[test]
    fn ranks_count_every_occurrence() {
        let map: RankMultimap<i32, i32> =
            [(10, 0), (20, 1), (20, 2), (30, 3)].into_iter().collect();
        assert_eq!(map.rank_of_key(&20), Some(1));
        assert_eq!(map.rank_lower_bound(&30), 3);
        assert_eq!(map.rank_upper_bound(&20), 3);
        assert_eq!(map.get_by_rank(2), Some((&20, &2)));
    }

    #[test]
    fn removal_peels_oldest_first() {
        let mut map = RankMultimap::new();
        for v in 0..4 {
            map.insert(7, v);
        }
        assert_eq!(map.remove_first(&7), Some(0));
        assert_eq!(map.remove_first(&7), Some(1));
        assert_eq!(map.remove_all(&7), 2);
        assert_eq!(map.remove_all(&7), 0);
        assert!(map.is_empty());
    }

    #[test]
    fn split_duplicates_still_peel_oldest_first() {
        // Four occurrences at order 4 split across two leaves; lookups and
        // removals must resolve to the occurrence left of the separator.
        let mut map = RankMultimap::with_order(4).unwrap();
        for v in 0..4 {
            map.insert(1, v);
        }
        assert_eq!(map.count(&1), 4);
        assert_eq!(map.rank_of_key(&1), Some(0));
        assert_eq!(map.remove_first(&1), Some(0));
        assert_eq!(map.remove_first(&1), Some(1));
        assert_eq!(map.count(&1), 2);
        map.as_tree().check_invariants_detailed().unwrap();
    }

    #[test]
    fn sorted_load_admits_equal_neighbors() {
        let map = RankMultimap::from_sorted_iter([(1, 'a'), (1, 'b'), (2, 'c')]).unwrap();
        assert_eq!(map.count(&1), 2);
        assert!(RankMultimap::from_sorted_iter([(2, 'a'), (1, 'b')]).is_err());
    }

    #[test]
    fn heavy_duplication_across_page_splits() {
        let mut map = RankMultimap::with_order(4).unwrap();
        for v in 0..100 {
            map.insert(1, v);
        }
        for v in 0..100 {
            map.insert(0, v + 1000);
        }
        assert_eq!(map.count(&1), 100);
        assert_eq!(map.rank_of_key(&1), Some(100));
        let ones: Vec<i32> = map.get_all(&1).copied().collect();
        assert_eq!(ones, (0..100).collect::<Vec<_>>());
        map.as_tree().check_invariants_detailed().unwrap();
    }
}
