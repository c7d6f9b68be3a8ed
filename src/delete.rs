//! Deletion engine.
//!
//! Removals run over a `Path`: take the entry out of the leaf, then repair
//! whatever that broke. A leaf that falls under the floor borrows from or
//! merges with the page to its right at the same depth, found by stepping the
//! frame stack sideways, so repair works the same whether the two pages share
//! a parent or not. A merge removes the absorbed page's slot from its own
//! parent, which may cascade: the demote loop walks the frame stack upward,
//! dropping keyless branches and finally collapsing a single-child root.
//!
//! Only the rightmost leaf can reach zero entries (every other leaf is
//! repaired before dropping below the floor, which is at least two), so the
//! empty-leaf unlink is an append-workload affair.

use crate::arena::{PageId, NULL_PAGE};
use crate::error::{Error, TreeResult};
use crate::path::{Frame, Path};
use crate::types::{BranchPage, LeafPage, PageRef, RankTree};

impl<K: Ord + Clone, V> RankTree<K, V> {
    // ========================================================================
    // PUBLIC REMOVE OPERATIONS
    // ========================================================================

    /// Remove a key, returning its value if it was present.
    ///
    /// With duplicate keys present, removes the leftmost occurrence.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranktree::RankTree;
    ///
    /// let mut tree = RankTree::with_default_order();
    /// tree.insert(1, "one");
    /// assert_eq!(tree.remove(&1), Some("one"));
    /// assert_eq!(tree.remove(&1), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let path = self.path_to_key(key);
        if !path.found {
            return None;
        }
        self.remove_at_path(path).map(|(_, value)| value)
    }

    /// Remove a key, failing if it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] and mutates nothing if the key is not
    /// in the tree.
    pub fn remove_item(&mut self, key: &K) -> TreeResult<V> {
        self.remove(key).ok_or(Error::KeyNotFound)
    }

    /// Remove the entry at `rank` (zero-based position in key order).
    ///
    /// # Errors
    ///
    /// Returns [`Error::RankOutOfBounds`] and mutates nothing if
    /// `rank >= len()`.
    pub fn remove_by_rank(&mut self, rank: usize) -> TreeResult<(K, V)> {
        let path = self.path_to_rank(rank)?;
        self.remove_at_path(path)
            .ok_or_else(|| Error::corrupted_tree("remove_by_rank", "rank path missed its leaf"))
    }

    // ========================================================================
    // REMOVAL OVER A PATH
    // ========================================================================

    /// Remove the entry a descent addressed, then restore every invariant:
    /// weights, pivots, occupancy floors, the leaf chain, and the caches.
    pub(crate) fn remove_at_path(&mut self, path: Path) -> Option<(K, V)> {
        if self
            .leaf(path.leaf)
            .map(|leaf| path.slot >= leaf.len())
            .unwrap_or(true)
        {
            return None;
        }
        self.touch();

        let entry = self.leaf_mut(path.leaf).map(|leaf| leaf.remove_at(path.slot))?;
        self.sub_weights(&path.frames, 1);

        let remaining = self.leaf(path.leaf).map(LeafPage::len).unwrap_or(0);
        if remaining == 0 {
            // Root leaf: an empty tree is just an empty root.
            if path.frames.is_empty() {
                return Some(entry);
            }
            self.unlink_leaf(path.leaf);
            self.leaves.free(path.leaf);
            self.demote(path.frames);
            return Some(entry);
        }

        // Removing slot 0 changes the first key this leaf contributes as a
        // pivot somewhere up the spine.
        if path.slot == 0 {
            if let Some(first) = self.leaf(path.leaf).and_then(LeafPage::first_key) {
                let first = first.clone();
                self.set_pivot(&path.frames, first);
            }
        }

        if remaining < self.leaf_floor() && path.leaf != self.last_leaf_id() {
            self.repair_leaf_underflow(&path);
        }
        Some(entry)
    }

    /// Splice a leaf out of the sibling chain and fix the extreme caches.
    fn unlink_leaf(&mut self, id: PageId) {
        let (prev, next) = match self.leaf(id) {
            Some(leaf) => (leaf.prev, leaf.next),
            None => return,
        };
        if prev != NULL_PAGE {
            if let Some(left) = self.leaf_mut(prev) {
                left.next = next;
            }
        }
        if next != NULL_PAGE {
            if let Some(right) = self.leaf_mut(next) {
                right.prev = prev;
            }
        }
        if self.first_leaf == id {
            self.first_leaf = next;
        }
        if self.last_leaf == id {
            self.last_leaf = prev;
        }
    }

    // ========================================================================
    // LEAF UNDERFLOW REPAIR
    // ========================================================================

    /// Rebalance an underfull leaf against the leaf to its right at the same
    /// depth. Borrow when the pair can end with both at or above the floor,
    /// merge otherwise.
    fn repair_leaf_underflow(&mut self, path: &Path) {
        let mut sib_frames = path.frames.clone();
        let sib_id = match self.right_adjacent(&mut sib_frames) {
            Some(PageRef::Leaf(id)) => id,
            // An underfull leaf that is not rightmost always has a right
            // neighbor at leaf depth.
            _ => return,
        };

        let own = self.leaf(path.leaf).map(LeafPage::len).unwrap_or(0);
        let sib = self.leaf(sib_id).map(LeafPage::len).unwrap_or(0);
        let floor = self.leaf_floor();

        if own + sib >= 2 * floor {
            // Borrow enough to even the pair out.
            let count = (own + sib).div_ceil(2) - own;
            if let Some((left, right)) = self.leaves.get_pair_mut(path.leaf, sib_id) {
                left.shift_from_right(right, count);
            }
            if let Some(first) = self.leaf(sib_id).and_then(LeafPage::first_key) {
                let first = first.clone();
                self.set_pivot(&sib_frames, first);
            }
            self.add_weights(&path.frames, count);
            self.sub_weights(&sib_frames, count);
        } else {
            // Merge: the pair fits in one page (own + sib < 2 * floor <= max).
            let moved = sib;
            let right_next = match self.leaves.get_pair_mut(path.leaf, sib_id) {
                Some((left, right)) => {
                    let right_next = left.merge_from(right);
                    left.next = right_next;
                    Some(right_next)
                }
                None => None,
            };
            match right_next {
                Some(next) if next != NULL_PAGE => {
                    if let Some(neighbor) = self.leaf_mut(next) {
                        neighbor.prev = path.leaf;
                    }
                }
                Some(_) => self.last_leaf = path.leaf,
                None => {}
            }
            self.add_weights(&path.frames, moved);
            self.sub_weights(&sib_frames, moved);
            self.leaves.free(sib_id);
            self.demote(sib_frames);
        }
    }

    // ========================================================================
    // DEMOTE CASCADE
    // ========================================================================

    /// Remove the child slot `frames` addresses from its parent, cascading
    /// upward through keyless branches and collapsing a single-child root.
    ///
    /// Iterative over the frame stack; depth bounds the loop at O(log n).
    fn demote(&mut self, mut frames: Vec<Frame>) {
        while let Some(frame) = frames.pop() {
            let branch_id = frame.branch;
            let at_root = frames.is_empty();

            enum Removal<K> {
                BranchEmptied,
                SlotDropped(Option<K>),
            }

            let removal = match self.branch_mut(branch_id) {
                Some(branch) if branch.keys.is_empty() => Removal::BranchEmptied,
                Some(branch) => {
                    if frame.child > 0 {
                        branch.keys.remove(frame.child - 1);
                        branch.children.remove(frame.child);
                        Removal::SlotDropped(None)
                    } else {
                        // Dropping child 0 moves key 0 up: it was the pivot
                        // for child 1, which is about to become child 0 here
                        // but keeps its old position in the wider tree.
                        let moved_up = branch.keys.remove(0);
                        branch.children.remove(0);
                        Removal::SlotDropped(Some(moved_up))
                    }
                }
                None => return,
            };

            match removal {
                Removal::BranchEmptied => {
                    // The removed child was this branch's only child (a legal
                    // transient shape for a rightmost branch); drop the whole
                    // page and keep cascading.
                    self.branches.free(branch_id);
                    if at_root {
                        // Unreachable through public operations (the root
                        // never stays keyless), but restore a sane empty tree
                        // rather than dangle.
                        let root_id = self.leaves.allocate(LeafPage::empty());
                        self.root = PageRef::Leaf(root_id);
                        self.first_leaf = root_id;
                        self.last_leaf = root_id;
                        return;
                    }
                    continue;
                }
                Removal::SlotDropped(pivot) => {
                    if let Some(key) = pivot {
                        self.set_pivot(&frames, key);
                    }
                }
            }

            if at_root {
                let collapse = self
                    .branch(branch_id)
                    .filter(|branch| branch.keys.is_empty())
                    .map(|branch| branch.children[0]);
                if let Some(only_child) = collapse {
                    self.branches.free(branch_id);
                    self.root = only_child;
                }
                return;
            }

            let len = self.branch(branch_id).map(BranchPage::len).unwrap_or(0);
            if len < self.branch_floor() {
                self.repair_branch_underflow(&frames, branch_id);
            }
            return;
        }
    }

    // ========================================================================
    // BRANCH UNDERFLOW REPAIR
    // ========================================================================

    /// Rebalance an underfull branch against the branch to its right at the
    /// same depth. `frames` addresses the underfull page, `branch_id` is that
    /// page.
    ///
    /// The separator between the pair is the sibling's pivot, read and
    /// rewritten through the sibling's frame stack, so the rotation works
    /// whether or not the two branches share a parent.
    fn repair_branch_underflow(&mut self, frames: &[Frame], branch_id: PageId) {
        let mut sib_frames = frames.to_vec();
        let sib_id = match self.right_adjacent(&mut sib_frames) {
            Some(PageRef::Branch(id)) => id,
            // Rightmost at this depth: exempt from the floor.
            _ => return,
        };
        let separator = match self.pivot_key(&sib_frames) {
            Some(key) => key,
            None => return,
        };

        let own = self.branch(branch_id).map(BranchPage::len).unwrap_or(0);
        let sib = self.branch(sib_id).map(BranchPage::len).unwrap_or(0);
        let floor = self.branch_floor();

        if own + sib >= 2 * floor {
            // Rotate children leftward through the separator.
            let count = (own + sib).div_ceil(2) - own;
            let moved_weight: usize = match self.branch(sib_id) {
                Some(branch) => branch.children[..count]
                    .iter()
                    .map(|page| self.page_weight(*page))
                    .sum(),
                None => return,
            };
            let new_separator = match self.branches.get_pair_mut(branch_id, sib_id) {
                Some((left, right)) => {
                    let new_separator = left.shift_from_right(separator, right, count);
                    left.weight += moved_weight;
                    right.weight -= moved_weight;
                    new_separator
                }
                None => return,
            };
            self.set_pivot(&sib_frames, new_separator);
            self.add_weights(frames, moved_weight);
            self.sub_weights(&sib_frames, moved_weight);
        } else {
            // Merge through the separator, then demote the absorbed page
            // from its own parent.
            let moved_weight = self.branch(sib_id).map(|branch| branch.weight).unwrap_or(0);
            if let Some((left, right)) = self.branches.get_pair_mut(branch_id, sib_id) {
                left.merge_from(separator, right);
            }
            self.add_weights(frames, moved_weight);
            self.sub_weights(&sib_frames, moved_weight);
            self.branches.free(sib_id);
            self.demote(sib_frames);
        }
    }
}
