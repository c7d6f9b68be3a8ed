//! Rank queries: position-indexed access over the sorted sequence.
//!
//! Branch weights make both directions logarithmic: rank-to-entry descends
//! subtracting child weights, entry-to-rank prices a search path by summing
//! the weights it passed.

use crate::error::TreeResult;
use crate::types::RankTree;

impl<K: Ord + Clone, V> RankTree<K, V> {
    /// Entry at `rank` (zero-based position in key order), or `None` if the
    /// rank is out of bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranktree::RankTree;
    ///
    /// let tree = RankTree::from_sorted_iter(4, (0..10).map(|i| (i, i * 10))).unwrap();
    /// assert_eq!(tree.get_by_rank(0), Some((&0, &0)));
    /// assert_eq!(tree.get_by_rank(9), Some((&9, &90)));
    /// assert_eq!(tree.get_by_rank(10), None);
    /// ```
    pub fn get_by_rank(&self, rank: usize) -> Option<(&K, &V)> {
        let path = self.path_to_rank(rank).ok()?;
        let leaf = self.leaf(path.leaf)?;
        Some((leaf.keys.get(path.slot)?, leaf.values.get(path.slot)?))
    }

    /// Like [`get_by_rank`](Self::get_by_rank), with a mutable payload.
    ///
    /// Handing out `&mut V` counts as a mutation: the stage advances and
    /// detached cursors go stale.
    pub fn get_by_rank_mut(&mut self, rank: usize) -> Option<(&K, &mut V)> {
        let path = self.path_to_rank(rank).ok()?;
        self.touch();
        let leaf = self.leaf_mut(path.leaf)?;
        if path.slot >= leaf.keys.len() {
            return None;
        }
        Some((&leaf.keys[path.slot], &mut leaf.values[path.slot]))
    }

    /// Entry at `rank`, with a descriptive error for a bad rank.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RankOutOfBounds`](crate::Error::RankOutOfBounds) if
    /// `rank >= len()`.
    pub fn try_get_by_rank(&self, rank: usize) -> TreeResult<(&K, &V)> {
        let path = self.path_to_rank(rank)?;
        let leaf = self.leaf(path.leaf).ok_or_else(|| {
            crate::Error::corrupted_tree("rank descent", "path references a freed leaf")
        })?;
        Ok((&leaf.keys[path.slot], &leaf.values[path.slot]))
    }

    /// Rank of `key`, or `None` if absent.
    ///
    /// With duplicate keys present this is the rank of the leftmost
    /// occurrence.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranktree::RankTree;
    ///
    /// let tree = RankTree::from_sorted_iter(4, [(10, ()), (20, ()), (30, ())]).unwrap();
    /// assert_eq!(tree.rank_of_key(&20), Some(1));
    /// assert_eq!(tree.rank_of_key(&25), None);
    /// ```
    pub fn rank_of_key(&self, key: &K) -> Option<usize> {
        let path = self.path_to_key(key);
        if !path.found {
            return None;
        }
        Some(self.rank_of_path(&path))
    }

    /// Number of keys strictly less than `key`, present or not.
    ///
    /// This is the rank `key` has or would have, and for a present key equals
    /// [`rank_of_key`](Self::rank_of_key).
    pub fn rank_lower_bound(&self, key: &K) -> usize {
        let path = self.path_to_key(key);
        self.rank_of_path(&path)
    }

    /// Number of keys less than or equal to `key`.
    ///
    /// `rank_upper_bound(k) - rank_lower_bound(k)` counts the occurrences of
    /// `k`, which is what the multimap façade uses.
    pub fn rank_upper_bound(&self, key: &K) -> usize {
        let path = self.path_to_key_upper(key);
        self.rank_of_path(&path)
    }

    /// Number of occurrences of `key` (0 or 1 unless duplicates were
    /// inserted).
    pub fn count_key(&self, key: &K) -> usize {
        self.rank_upper_bound(key) - self.rank_lower_bound(key)
    }

    /// First entry in key order, in O(1) off the leftmost-leaf cache.
    pub fn first(&self) -> Option<(&K, &V)> {
        let leaf = self.leaf(self.first_leaf_id())?;
        Some((leaf.keys.first()?, leaf.values.first()?))
    }

    /// Last entry in key order, in O(1) off the rightmost-leaf cache.
    pub fn last(&self) -> Option<(&K, &V)> {
        let leaf = self.leaf(self.last_leaf_id())?;
        Some((leaf.keys.last()?, leaf.values.last()?))
    }

    /// Remove and return the first entry.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        if self.is_empty() {
            return None;
        }
        self.remove_by_rank(0).ok()
    }

    /// Remove and return the last entry.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        self.remove_by_rank(len - 1).ok()
    }
}
