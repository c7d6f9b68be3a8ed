//! Page-local operations for leaf and branch pages.
//!
//! Everything here is oblivious to the page's position in the tree: searches,
//! indexed edits, splits and content transfers. Structural decisions (when to
//! split, whom to borrow from) live in the insert/delete engines operating
//! over a `Path`.

use crate::arena::PageId;
use crate::types::{BranchPage, LeafPage, PageRef};

// ============================================================================
// LEAF PAGE OPERATIONS
// ============================================================================

impl<K: Ord, V> LeafPage<K, V> {
    /// Binary search: `Ok(slot)` on an exact hit, `Err(insertion point)` on a
    /// miss.
    #[inline]
    pub(crate) fn search(&self, key: &K) -> Result<usize, usize> {
        self.keys.binary_search(key)
    }

    /// First slot whose key is not less than `key`.
    ///
    /// With duplicate keys present this is the leftmost equal slot, which
    /// plain binary search does not promise.
    #[inline]
    pub(crate) fn lower_bound(&self, key: &K) -> usize {
        self.keys.partition_point(|k| k < key)
    }

    /// First slot whose key is greater than `key`.
    #[inline]
    pub(crate) fn upper_bound(&self, key: &K) -> usize {
        self.keys.partition_point(|k| k <= key)
    }

    /// Insert an entry at `slot`, shifting the tail right.
    pub(crate) fn insert_at(&mut self, slot: usize, key: K, value: V) {
        self.keys.insert(slot, key);
        self.values.insert(slot, value);
    }

    /// Remove and return the entry at `slot`.
    pub(crate) fn remove_at(&mut self, slot: usize) -> (K, V) {
        (self.keys.remove(slot), self.values.remove(slot))
    }

    /// Split off the tail starting at `mid` into a new unlinked leaf.
    ///
    /// Sibling links are left untouched; the caller threads the new page
    /// into the leaf chain once it has an arena id.
    pub(crate) fn split_tail(&mut self, mid: usize) -> LeafPage<K, V> {
        LeafPage {
            keys: self.keys.split_off(mid),
            values: self.values.split_off(mid),
            next: crate::arena::NULL_PAGE,
            prev: crate::arena::NULL_PAGE,
        }
    }

    /// Move every entry of `right` onto the end of this leaf, returning the
    /// right page's old successor for relinking.
    pub(crate) fn merge_from(&mut self, right: &mut LeafPage<K, V>) -> PageId {
        self.keys.append(&mut right.keys);
        self.values.append(&mut right.values);
        right.next
    }

    /// Move the first `count` entries of `right` onto the end of this leaf.
    pub(crate) fn shift_from_right(&mut self, right: &mut LeafPage<K, V>, count: usize) {
        self.keys.extend(right.keys.drain(..count));
        self.values.extend(right.values.drain(..count));
    }

    /// First key, if any.
    pub(crate) fn first_key(&self) -> Option<&K> {
        self.keys.first()
    }
}

// ============================================================================
// BRANCH PAGE OPERATIONS
// ============================================================================

impl<K: Ord> BranchPage<K> {
    /// Index of the child that owns `key`.
    ///
    /// A hit routes right: a separator is a copy of its right child's first
    /// key, so for unique keys the match is always there. Duplicate-aware
    /// descents must use [`route_lower`](Self::route_lower) instead, since
    /// equal keys can also sit at the end of the left child.
    #[inline]
    pub(crate) fn route(&self, key: &K) -> usize {
        match self.keys.binary_search(key) {
            Ok(index) => index + 1,
            Err(index) => index,
        }
    }

    /// Index of the leftmost child that may hold keys equal to `key`.
    ///
    /// Routes left of any separator equal to `key`: the first occurrence can
    /// end a left child even though the separator (the right child's first
    /// key) compares equal.
    #[inline]
    pub(crate) fn route_lower(&self, key: &K) -> usize {
        self.keys.partition_point(|k| k < key)
    }

    /// Index of the rightmost child that may hold keys equal to `key`.
    ///
    /// Used by duplicate-admitting inserts so equal keys land after their
    /// predecessors.
    #[inline]
    pub(crate) fn route_upper(&self, key: &K) -> usize {
        self.keys.partition_point(|k| k <= key)
    }

    /// Insert a separator and its right child at `index`.
    pub(crate) fn insert_pair(&mut self, index: usize, separator: K, child: PageRef) {
        self.keys.insert(index, separator);
        self.children.insert(index + 1, child);
    }

    /// Split at `mid`, promoting the key at `mid` and returning it with the
    /// new right page.
    ///
    /// The caller recomputes both pages' weights from their children.
    pub(crate) fn split_promote(&mut self, mid: usize) -> (K, BranchPage<K>) {
        let right_keys = self.keys.split_off(mid + 1);
        let right_children = self.children.split_off(mid + 1);
        let promoted = match self.keys.pop() {
            Some(key) => key,
            // mid is always in range; an empty pop cannot happen for a page
            // that just overflowed.
            None => unreachable!("split of a branch with no keys"),
        };
        (
            promoted,
            BranchPage {
                keys: right_keys,
                children: right_children,
                weight: 0,
            },
        )
    }

    /// Fold `right` into this page through the separator that divided them.
    pub(crate) fn merge_from(&mut self, separator: K, right: &mut BranchPage<K>) {
        self.keys.push(separator);
        self.keys.append(&mut right.keys);
        self.children.append(&mut right.children);
        self.weight += right.weight;
        right.weight = 0;
    }

    /// Rotate the first `count` children of `right` into this page through
    /// `separator`, returning the key that becomes the new separator.
    pub(crate) fn shift_from_right(
        &mut self,
        separator: K,
        right: &mut BranchPage<K>,
        count: usize,
    ) -> K {
        let mut moved_keys: Vec<K> = right.keys.drain(..count).collect();
        let new_separator = match moved_keys.pop() {
            Some(key) => key,
            None => unreachable!("branch rotation of zero keys"),
        };
        self.keys.push(separator);
        self.keys.append(&mut moved_keys);
        self.children.extend(right.children.drain(..count));
        new_separator
    }
}
