//! `RankMap`: a unique-key ordered dictionary over the core tree.
//!
//! The façade narrows the engine to a `BTreeMap`-shaped surface with the
//! rank queries added; everything forwards, nothing is reimplemented.

use std::ops::RangeBounds;

use crate::construction::DEFAULT_ORDER;
use crate::error::TreeResult;
use crate::iter::{Iter, Keys, Range, Values};
use crate::types::RankTree;

/// Ordered key-value map with O(log n) access by rank.
///
/// # Examples
///
/// ```
/// use ranktree::RankMap;
///
/// let mut scores = RankMap::new();
/// scores.insert("ada", 95);
/// scores.insert("bob", 80);
/// scores.insert("cat", 88);
///
/// // Keyed access, like a BTreeMap.
/// assert_eq!(scores.get(&"bob"), Some(&80));
/// // Positional access, which a BTreeMap cannot do in O(log n).
/// assert_eq!(scores.get_by_rank(2), Some((&"cat", &88)));
/// assert_eq!(scores.rank_of_key(&"bob"), Some(1));
/// ```
#[derive(Debug)]
pub struct RankMap<K, V> {
    tree: RankTree<K, V>,
}

impl<K, V> Default for RankMap<K, V> {
    fn default() -> Self {
        Self {
            tree: RankTree::default(),
        }
    }
}

impl<K: Ord + Clone, V> RankMap<K, V> {
    /// Create an empty map with the default page size.
    pub fn new() -> Self {
        Self {
            tree: RankTree::with_default_order(),
        }
    }

    /// Create an empty map with an explicit fan-out bound.
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

    /// Build a map from entries sorted by strictly ascending key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsortedBulkLoad`](crate::Error::UnsortedBulkLoad)
    /// if the input is not strictly ascending.
    pub fn from_sorted_iter<I>(entries: I) -> TreeResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Ok(Self {
            tree: RankTree::from_sorted_iter(DEFAULT_ORDER, entries)?,
        })
    }

    /// Insert a pair, returning the previous value under the key, if any.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.tree.insert(key, value)
    }

    /// Remove a key, returning its value if it was present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.tree.remove(key)
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

    /// Value under `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.tree.get(key)
    }

    /// Mutable value under `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.tree.get_mut(key)
    }

    /// Returns true if `key` is present.
    pub fn contains_key(&self, key: &K) -> bool {
        self.tree.contains_key(key)
    }

    /// Entry at `rank` (zero-based position in key order).
    pub fn get_by_rank(&self, rank: usize) -> Option<(&K, &V)> {
        self.tree.get_by_rank(rank)
    }

    /// Entry at `rank`, with a mutable payload.
    pub fn get_by_rank_mut(&mut self, rank: usize) -> Option<(&K, &mut V)> {
        self.tree.get_by_rank_mut(rank)
    }

    /// Rank of `key`, or `None` if absent.
    pub fn rank_of_key(&self, key: &K) -> Option<usize> {
        self.tree.rank_of_key(key)
    }

    /// Number of keys strictly less than `key`.
    pub fn rank_lower_bound(&self, key: &K) -> usize {
        self.tree.rank_lower_bound(key)
    }

    /// First entry in key order.
    pub fn first(&self) -> Option<(&K, &V)> {
        self.tree.first()
    }

    /// Last entry in key order.
    pub fn last(&self) -> Option<(&K, &V)> {
        self.tree.last()
    }

    /// Remove and return the first entry.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        self.tree.pop_first()
    }

    /// Remove and return the last entry.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        self.tree.pop_last()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns true if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Remove every entry, keeping the configured order.
    pub fn clear(&mut self) {
        self.tree.clear()
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.tree.iter()
    }

    /// Iterate keys in order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        self.tree.keys()
    }

    /// Iterate values in key order.
    pub fn values(&self) -> Values<'_, K, V> {
        self.tree.values()
    }

    /// Iterate the entries whose keys fall in `range`.
    pub fn range<R>(&self, range: R) -> Range<'_, K, V>
    where
        R: RangeBounds<K>,
    {
        self.tree.range(range)
    }

    /// Borrow the underlying tree, for rank bounds, cursors, and
    /// invariant checks.
    pub fn as_tree(&self) -> &RankTree<K, V> {
        &self.tree
    }
}

impl<K: Ord + Clone, V> FromIterator<(K, V)> for RankMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<K: Ord + Clone, V> Extend<(K, V)> for RankMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K: Ord + Clone, V> IntoIterator for &'a RankMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn behaves_like_an_ordered_map() {
        let mut map: RankMap<i32, &str> = RankMap::new();
        assert_eq!(map.insert(2, "two"), None);
        assert_eq!(map.insert(1, "one"), None);
        assert_eq!(map.insert(2, "zwei"), Some("two"));

        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&2), Some(&"zwei"));
        assert_eq!(map.first(), Some((&1, &"one")));
        assert_eq!(map.remove(&1), Some("one"));
        assert_eq!(map.remove(&1), None);
    }

    #[test]
    fn rank_surface_forwards() {
        let map: RankMap<i32, i32> = (0..50).map(|i| (i, i * i)).collect();
        assert_eq!(map.get_by_rank(7), Some((&7, &49)));
        assert_eq!(map.rank_of_key(&10), Some(10));
        assert_eq!(map.rank_lower_bound(&1000), 50);
        map.as_tree().check_invariants_detailed().unwrap();
    }

    #[test]
    fn bulk_and_range() {
        let map = RankMap::from_sorted_iter((0..100).map(|i| (i, ()))).unwrap();
        let mid: Vec<i32> = map.range(40..45).map(|(k, _)| *k).collect();
        assert_eq!(mid, vec![40, 41, 42, 43, 44]);
        assert!(RankMap::from_sorted_iter([(2, ()), (1, ())]).is_err());
    }
}
