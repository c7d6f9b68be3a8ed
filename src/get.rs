//! Point lookups.
//!
//! Lookups descend without building a `Path`: routing down the branches and
//! binary-searching the leaf is all a read needs.

use crate::types::{PageRef, RankTree};

impl<K: Ord, V> RankTree<K, V> {
    /// Locate the leaf and slot holding `key`, if present.
    fn locate(&self, key: &K) -> Option<(crate::arena::PageId, usize)> {
        let mut page = self.root;
        loop {
            match page {
                PageRef::Branch(id) => {
                    let branch = self.branch(id)?;
                    page = *branch.children.get(branch.route(key))?;
                }
                PageRef::Leaf(id) => {
                    let slot = self.leaf(id)?.search(key).ok()?;
                    return Some((id, slot));
                }
            }
        }
    }

    /// Value stored under `key`.
    ///
    /// With duplicate keys present, an arbitrary occurrence's value; use the
    /// range API to see them all.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranktree::RankTree;
    ///
    /// let mut tree = RankTree::with_default_order();
    /// tree.insert("a", 1);
    /// assert_eq!(tree.get(&"a"), Some(&1));
    /// assert_eq!(tree.get(&"b"), None);
    /// ```
    pub fn get(&self, key: &K) -> Option<&V> {
        let (leaf_id, slot) = self.locate(key)?;
        self.leaf(leaf_id)?.values.get(slot)
    }

    /// Mutable value stored under `key`.
    ///
    /// Handing out `&mut V` counts as a mutation even though the structure
    /// cannot change: the stage advances and detached cursors go stale, the
    /// same as the value-replacing path of `insert`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let (leaf_id, slot) = self.locate(key)?;
        self.touch();
        self.leaf_mut(leaf_id)?.values.get_mut(slot)
    }

    /// Key-value pair stored under `key`.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let (leaf_id, slot) = self.locate(key)?;
        let leaf = self.leaf(leaf_id)?;
        Some((leaf.keys.get(slot)?, leaf.values.get(slot)?))
    }

    /// Returns true if `key` is present.
    pub fn contains_key(&self, key: &K) -> bool {
        self.locate(key).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hits_and_misses_across_depths() {
        let tree = RankTree::from_sorted_iter(4, (0..200).map(|i| (i * 2, i))).unwrap();
        for i in 0..200 {
            assert_eq!(tree.get(&(i * 2)), Some(&i));
            assert_eq!(tree.get(&(i * 2 + 1)), None);
        }
        assert!(tree.contains_key(&0));
        assert!(!tree.contains_key(&-1));
        assert_eq!(tree.get_key_value(&10), Some((&10, &5)));
    }

    #[test]
    fn get_mut_edits_in_place_and_advances_the_stage() {
        let mut tree = RankTree::from_sorted_iter(4, (0..20).map(|i| (i, 0))).unwrap();
        let shape = tree.leaf_sizes();
        let stage = tree.stage();
        if let Some(value) = tree.get_mut(&13) {
            *value = 7;
        }
        assert_eq!(tree.get(&13), Some(&7));
        // The structure is untouched, but the mutable handout still counts.
        assert_eq!(tree.leaf_sizes(), shape);
        assert_ne!(tree.stage(), stage);
        // A miss hands nothing out and mutates nothing.
        let stage = tree.stage();
        assert_eq!(tree.get_mut(&99), None);
        assert_eq!(tree.stage(), stage);
    }

    #[test]
    fn empty_tree_misses_everything() {
        let tree = RankTree::<i32, i32>::new(4).unwrap();
        assert_eq!(tree.get(&1), None);
        assert!(!tree.contains_key(&1));
    }
}
