//! Insertion engine.
//!
//! Inserts run over a `Path`: in place when the leaf has room, otherwise by
//! split-and-promote cascading up the recorded frames, grafting a new root if
//! the cascade reaches the top. Subtree weights gain the new element before
//! any split, so split halves can be recomputed from child weights alone.
//!
//! Split bias, applied uniformly at every level: an append at the global end
//! produces a minimal right page (the ascending-insert fast path); every
//! other split is a half split.

use crate::arena::NULL_PAGE;
use crate::error::{Error, TreeResult};
use crate::path::{Frame, Path};
use crate::types::{BranchPage, LeafPage, PageRef, RankTree};

impl<K: Ord + Clone, V> RankTree<K, V> {
    // ========================================================================
    // PUBLIC INSERT OPERATIONS
    // ========================================================================

    /// Insert a key-value pair, replacing and returning any existing value
    /// for the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranktree::RankTree;
    ///
    /// let mut tree = RankTree::with_default_order();
    /// assert_eq!(tree.insert(1, "one"), None);
    /// assert_eq!(tree.insert(1, "uno"), Some("one"));
    /// assert_eq!(tree.get(&1), Some(&"uno"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let path = self.path_to_key(&key);
        if path.found {
            self.touch();
            return self
                .leaf_mut(path.leaf)
                .map(|leaf| std::mem::replace(&mut leaf.values[path.slot], value));
        }
        self.insert_at_path(&path, key, value);
        None
    }

    /// Insert a key-value pair, rejecting duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`] and mutates nothing if the key is
    /// already present.
    pub fn try_insert(&mut self, key: K, value: V) -> TreeResult<()> {
        let path = self.path_to_key(&key);
        if path.found {
            return Err(Error::DuplicateKey);
        }
        self.insert_at_path(&path, key, value);
        Ok(())
    }

    /// Insert a key-value pair, admitting duplicate keys.
    ///
    /// Equal keys land after every existing occurrence, so they enumerate in
    /// insertion order.
    pub fn insert_dup(&mut self, key: K, value: V) {
        let path = self.path_to_key_upper(&key);
        self.insert_at_path(&path, key, value);
    }

    // ========================================================================
    // INSERTION OVER A PATH
    // ========================================================================

    /// Insert at the slot a descent recorded, maintaining weights, the leaf
    /// chain, and the extreme-leaf caches.
    pub(crate) fn insert_at_path(&mut self, path: &Path, key: K, value: V) {
        self.touch();
        let max_keys = self.max_keys();
        let leaf_len = self.leaf(path.leaf).map(LeafPage::len).unwrap_or(0);

        if leaf_len < max_keys {
            if let Some(leaf) = self.leaf_mut(path.leaf) {
                leaf.insert_at(path.slot, key, value);
            }
            self.add_weights(&path.frames, 1);
            return;
        }

        if path.leaf == self.last_leaf_id() && path.slot == leaf_len {
            self.append_past_last_leaf(path, key, value);
        } else {
            self.split_leaf_and_insert(path, key, value);
        }
    }

    /// Fast path for ascending-insert workloads: appending at the end of a
    /// full rightmost leaf skips the split and starts a fresh singleton leaf.
    ///
    /// The new leaf is the rightmost and therefore exempt from the floor.
    fn append_past_last_leaf(&mut self, path: &Path, key: K, value: V) {
        let separator = key.clone();
        let new_leaf = LeafPage {
            keys: vec![key],
            values: vec![value],
            next: NULL_PAGE,
            prev: path.leaf,
        };
        let new_id = self.leaves.allocate(new_leaf);
        if let Some(old_last) = self.leaf_mut(path.leaf) {
            old_last.next = new_id;
        }
        self.last_leaf = new_id;
        self.add_weights(&path.frames, 1);
        self.promote(&path.frames, separator, PageRef::Leaf(new_id), true);
    }

    /// General split: insert into the (transiently overfull) leaf, split off
    /// the upper half, thread the new leaf into the chain, and promote its
    /// first key.
    fn split_leaf_and_insert(&mut self, path: &Path, key: K, value: V) {
        let (mut right, old_next) = match self.leaf_mut(path.leaf) {
            Some(leaf) => {
                leaf.insert_at(path.slot, key, value);
                let mid = leaf.len().div_ceil(2);
                (leaf.split_tail(mid), leaf.next)
            }
            None => return,
        };
        let separator = match right.first_key() {
            Some(first) => first.clone(),
            None => return,
        };
        right.prev = path.leaf;
        right.next = old_next;
        let new_id = self.leaves.allocate(right);

        if let Some(left) = self.leaf_mut(path.leaf) {
            left.next = new_id;
        }
        if old_next != NULL_PAGE {
            if let Some(neighbor) = self.leaf_mut(old_next) {
                neighbor.prev = new_id;
            }
        } else {
            self.last_leaf = new_id;
        }

        self.add_weights(&path.frames, 1);
        self.promote(&path.frames, separator, PageRef::Leaf(new_id), false);
    }

    // ========================================================================
    // PROMOTE CASCADE
    // ========================================================================

    /// Insert a promoted (separator, right child) pair into the parent frame,
    /// splitting upward as needed and grafting a new root when the cascade
    /// passes the top frame.
    ///
    /// Iterative over the path stack; depth bounds the loop at O(log n).
    fn promote(&mut self, frames: &[Frame], separator: K, child: PageRef, appended: bool) {
        let max_keys = self.max_keys();
        let mut separator = separator;
        let mut child = child;

        let mut depth = frames.len();
        while depth > 0 {
            depth -= 1;
            let frame = frames[depth];
            let branch_len = self.branch(frame.branch).map(BranchPage::len).unwrap_or(0);

            if branch_len < max_keys {
                if let Some(branch) = self.branch_mut(frame.branch) {
                    branch.insert_pair(frame.child, separator, child);
                }
                return;
            }

            // Full parent: insert, then split. An appended promotion splits
            // off a minimal right page, mirroring the leaf fast path.
            let at_end = frame.child == branch_len;
            let (promoted, mut right) = match self.branch_mut(frame.branch) {
                Some(branch) => {
                    branch.insert_pair(frame.child, separator, child);
                    let mid = if appended && at_end {
                        branch.len() - 2
                    } else {
                        branch.len() / 2
                    };
                    branch.split_promote(mid)
                }
                None => return,
            };

            // The donor's weight already counts the new element; subtract
            // what moved out and give it to the new page.
            let right_weight: usize = right
                .children
                .iter()
                .map(|page| self.page_weight(*page))
                .sum();
            right.weight = right_weight;
            if let Some(branch) = self.branch_mut(frame.branch) {
                branch.weight -= right_weight;
            }
            let right_id = self.branches.allocate(right);

            separator = promoted;
            child = PageRef::Branch(right_id);
        }

        // The cascade cleared every frame: graft a new root.
        let old_root = self.root;
        let weight = self.page_weight(old_root) + self.page_weight(child);
        let root = BranchPage {
            keys: vec![separator],
            children: vec![old_root, child],
            weight,
        };
        self.root = PageRef::Branch(self.branches.allocate(root));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascending_append_uses_singleton_leaves() {
        let mut tree = RankTree::new(4).unwrap();
        for i in 1..=4 {
            tree.insert(i, ());
        }
        // The 4th insert appends a fresh rightmost leaf instead of splitting.
        assert_eq!(tree.leaf_sizes(), vec![3, 1]);
        tree.check_invariants_detailed().unwrap();
    }

    #[test]
    fn interior_insert_splits_in_half() {
        let mut tree = RankTree::new(4).unwrap();
        for i in [10, 20, 30] {
            tree.insert(i, ());
        }
        tree.insert(15, ());
        // Overfull [10, 15, 20, 30] splits at ceil(4 / 2).
        assert_eq!(tree.leaf_sizes(), vec![2, 2]);
        tree.check_invariants_detailed().unwrap();
    }

    #[test]
    fn replace_does_not_grow_the_tree() {
        let mut tree = RankTree::new(4).unwrap();
        for i in 0..20 {
            tree.insert(i, i);
        }
        let before = tree.len();
        assert_eq!(tree.insert(7, 700), Some(7));
        assert_eq!(tree.len(), before);
        assert_eq!(tree.get(&7), Some(&700));
    }

    #[test]
    fn try_insert_rejects_duplicates_without_mutation() {
        let mut tree = RankTree::new(4).unwrap();
        tree.insert(1, "one");
        let stage = tree.stage();
        assert_eq!(tree.try_insert(1, "uno"), Err(Error::DuplicateKey));
        assert_eq!(tree.stage(), stage);
        assert_eq!(tree.get(&1), Some(&"one"));
    }

    #[test]
    fn duplicate_inserts_keep_arrival_order() {
        let mut tree = RankTree::new(4).unwrap();
        for tag in 0..5 {
            tree.insert_dup(1, tag);
        }
        tree.insert_dup(0, 100);
        tree.insert_dup(2, 200);
        let values: Vec<i32> = tree.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![100, 0, 1, 2, 3, 4, 200]);
        tree.check_invariants_detailed().unwrap();
    }

    #[test]
    fn random_inserts_stay_valid() {
        use rand::prelude::*;
        let mut rng = StdRng::seed_from_u64(7);
        let mut keys: Vec<i32> = (0..500).collect();
        keys.shuffle(&mut rng);

        let mut tree = RankTree::new(5).unwrap();
        for &k in &keys {
            tree.insert(k, k * 2);
            tree.check_invariants_detailed().unwrap();
        }
        assert_eq!(tree.len(), 500);
        let collected: Vec<i32> = tree.iter().map(|(k, _)| *k).collect();
        assert_eq!(collected, (0..500).collect::<Vec<_>>());
    }
}
