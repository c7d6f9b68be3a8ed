//! Iteration over the leaf chain.
//!
//! Borrowed iterators walk the linked leaves directly, caching a reference
//! to the current leaf so each step is an index bump and, at page ends, one
//! arena hop. They borrow the tree, so the tree cannot change under them.
//!
//! The detached [`Cursor`] holds no borrow at all; it captures the stage
//! counter instead and every dereference re-validates it, surfacing
//! [`Error::TreeModified`] if the tree mutated since the cursor was taken.

use std::ops::{Bound, RangeBounds};

use crate::arena::{PageId, NULL_PAGE};
use crate::error::{Error, TreeResult};
use crate::types::{LeafPage, RankTree};

// ============================================================================
// FORWARD ITERATION
// ============================================================================

/// Forward iterator over `(&K, &V)` in key order.
pub struct Iter<'a, K, V> {
    tree: &'a RankTree<K, V>,
    leaf: Option<&'a LeafPage<K, V>>,
    slot: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn new(tree: &'a RankTree<K, V>) -> Self {
        Self {
            tree,
            leaf: tree.leaf(tree.first_leaf_id()),
            slot: 0,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let leaf = self.leaf?;
            if self.slot < leaf.len() {
                let item = (&leaf.keys[self.slot], &leaf.values[self.slot]);
                self.slot += 1;
                return Some(item);
            }
            if leaf.next == NULL_PAGE {
                self.leaf = None;
                return None;
            }
            self.leaf = self.tree.leaf(leaf.next);
            self.slot = 0;
        }
    }
}

/// Reverse iterator over `(&K, &V)`, walking the `prev` links.
pub struct RevIter<'a, K, V> {
    tree: &'a RankTree<K, V>,
    leaf: Option<&'a LeafPage<K, V>>,
    /// One past the next slot to yield; 0 means this leaf is exhausted.
    slot: usize,
}

impl<'a, K, V> RevIter<'a, K, V> {
    fn new(tree: &'a RankTree<K, V>) -> Self {
        let leaf = tree.leaf(tree.last_leaf_id());
        let slot = leaf.map(LeafPage::len).unwrap_or(0);
        Self { tree, leaf, slot }
    }
}

impl<'a, K, V> Iterator for RevIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let leaf = self.leaf?;
            if self.slot > 0 {
                self.slot -= 1;
                return Some((&leaf.keys[self.slot], &leaf.values[self.slot]));
            }
            if leaf.prev == NULL_PAGE {
                self.leaf = None;
                return None;
            }
            self.leaf = self.tree.leaf(leaf.prev);
            self.slot = self.leaf.map(LeafPage::len).unwrap_or(0);
        }
    }
}

/// Iterator over `&K` in key order.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }
}

/// Iterator over `&V` in key order.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }
}

// ============================================================================
// RANGE ITERATION
// ============================================================================

/// Forward iterator over the entries inside a key range.
///
/// The start bound positions the iterator with one descent; the end bound is
/// checked per item, so an inverted range simply yields nothing.
pub struct Range<'a, K, V> {
    inner: Iter<'a, K, V>,
    end: Bound<K>,
}

impl<'a, K: Ord, V> Iterator for Range<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let (key, value) = self.inner.next()?;
        let inside = match &self.end {
            Bound::Unbounded => true,
            Bound::Included(end) => key <= end,
            Bound::Excluded(end) => key < end,
        };
        if inside {
            Some((key, value))
        } else {
            // Past the end; pin the iterator shut.
            self.inner.leaf = None;
            None
        }
    }
}

// ============================================================================
// TREE ENUMERATION METHODS
// ============================================================================

impl<K, V> RankTree<K, V> {
    /// Iterate all entries in key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranktree::RankTree;
    ///
    /// let tree = RankTree::from_sorted_iter(4, [(1, "a"), (2, "b")]).unwrap();
    /// let pairs: Vec<_> = tree.iter().map(|(k, v)| (*k, *v)).collect();
    /// assert_eq!(pairs, vec![(1, "a"), (2, "b")]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self)
    }

    /// Iterate all entries in reverse key order.
    pub fn iter_rev(&self) -> RevIter<'_, K, V> {
        RevIter::new(self)
    }

    /// Iterate all keys in order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Iterate all values in key order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }
}

impl<K: Ord + Clone, V> RankTree<K, V> {
    /// Iterate the entries whose keys fall in `range`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranktree::RankTree;
    ///
    /// let tree = RankTree::from_sorted_iter(4, (0..10).map(|i| (i, ()))).unwrap();
    /// let keys: Vec<i32> = tree.range(3..7).map(|(k, _)| *k).collect();
    /// assert_eq!(keys, vec![3, 4, 5, 6]);
    /// ```
    pub fn range<R>(&self, range: R) -> Range<'_, K, V>
    where
        R: RangeBounds<K>,
    {
        let (leaf, slot) = match range.start_bound() {
            Bound::Unbounded => (self.leaf(self.first_leaf_id()), 0),
            Bound::Included(key) => {
                let path = self.path_to_key(key);
                (self.leaf(path.leaf), path.slot)
            }
            Bound::Excluded(key) => {
                let path = self.path_to_key_upper(key);
                (self.leaf(path.leaf), path.slot)
            }
        };
        let end = match range.end_bound() {
            Bound::Unbounded => Bound::Unbounded,
            Bound::Included(key) => Bound::Included(key.clone()),
            Bound::Excluded(key) => Bound::Excluded(key.clone()),
        };
        Range {
            inner: Iter {
                tree: self,
                leaf,
                slot,
            },
            end,
        }
    }
}

impl<'a, K, V> IntoIterator for &'a RankTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// DETACHED CURSOR
// ============================================================================

/// A detached position in the tree: a leaf, a slot, and the stage at capture.
///
/// A cursor does not borrow the tree, so the tree can mutate while cursors
/// exist; any use of a cursor after a mutation fails with
/// [`Error::TreeModified`] instead of reading through a stale position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    stage: u64,
    leaf: PageId,
    slot: usize,
}

impl<K: Ord + Clone, V> RankTree<K, V> {
    /// Cursor at the first entry, or `None` if the tree is empty.
    pub fn cursor_first(&self) -> Option<Cursor> {
        if self.is_empty() {
            return None;
        }
        Some(Cursor {
            stage: self.stage(),
            leaf: self.first_leaf_id(),
            slot: 0,
        })
    }

    /// Cursor at the last entry, or `None` if the tree is empty.
    pub fn cursor_last(&self) -> Option<Cursor> {
        let leaf = self.last_leaf_id();
        let len = self.leaf(leaf).map(LeafPage::len)?;
        if len == 0 {
            return None;
        }
        Some(Cursor {
            stage: self.stage(),
            leaf,
            slot: len - 1,
        })
    }

    /// Cursor at the entry with the given rank.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RankOutOfBounds`](crate::Error::RankOutOfBounds) if
    /// `rank >= len()`.
    pub fn cursor_at_rank(&self, rank: usize) -> TreeResult<Cursor> {
        let path = self.path_to_rank(rank)?;
        Ok(Cursor {
            stage: self.stage(),
            leaf: path.leaf,
            slot: path.slot,
        })
    }

    /// Entry under `cursor`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TreeModified`] if the tree has mutated since the
    /// cursor was taken.
    pub fn cursor_entry(&self, cursor: &Cursor) -> TreeResult<(&K, &V)> {
        self.check_stage(cursor.stage)?;
        let leaf = self
            .leaf(cursor.leaf)
            .ok_or_else(|| Error::corrupted_tree("cursor", "cursor references a freed leaf"))?;
        Ok((&leaf.keys[cursor.slot], &leaf.values[cursor.slot]))
    }

    /// Step `cursor` to the next entry. Returns false (leaving the cursor in
    /// place) at the last entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TreeModified`] if the tree has mutated since the
    /// cursor was taken.
    pub fn cursor_advance(&self, cursor: &mut Cursor) -> TreeResult<bool> {
        self.check_stage(cursor.stage)?;
        let leaf = self
            .leaf(cursor.leaf)
            .ok_or_else(|| Error::corrupted_tree("cursor", "cursor references a freed leaf"))?;
        if cursor.slot + 1 < leaf.len() {
            cursor.slot += 1;
            return Ok(true);
        }
        if leaf.next == NULL_PAGE {
            return Ok(false);
        }
        cursor.leaf = leaf.next;
        cursor.slot = 0;
        Ok(true)
    }

    /// Step `cursor` to the previous entry. Returns false (leaving the
    /// cursor in place) at the first entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TreeModified`] if the tree has mutated since the
    /// cursor was taken.
    pub fn cursor_retreat(&self, cursor: &mut Cursor) -> TreeResult<bool> {
        self.check_stage(cursor.stage)?;
        let leaf = self
            .leaf(cursor.leaf)
            .ok_or_else(|| Error::corrupted_tree("cursor", "cursor references a freed leaf"))?;
        if cursor.slot > 0 {
            cursor.slot -= 1;
            return Ok(true);
        }
        if leaf.prev == NULL_PAGE {
            return Ok(false);
        }
        let prev = leaf.prev;
        let prev_len = self
            .leaf(prev)
            .map(LeafPage::len)
            .ok_or_else(|| Error::corrupted_tree("cursor", "leaf chain references a freed page"))?;
        cursor.leaf = prev;
        cursor.slot = prev_len - 1;
        Ok(true)
    }
}
