//! Structural invariant checking.
//!
//! `check_invariants_detailed` walks the whole tree and cross-checks every
//! property the engines maintain: page ordering, occupancy floors with the
//! rightmost and root exemptions, pivot keys against leftmost descendant
//! leaves, subtree weights, uniform leaf depth, the doubly linked leaf
//! chain, the extreme-leaf caches, and arena accounting. Tests call it after
//! every mutation; it is deliberately thorough rather than fast.

use crate::arena::NULL_PAGE;
use crate::types::{PageRef, RankTree};

/// Facts gathered about one subtree during the walk.
struct SubtreeReport<'a, K> {
    first_key: Option<&'a K>,
    last_key: Option<&'a K>,
    weight: usize,
    depth: usize,
    leaf_pages: usize,
    branch_pages: usize,
}

impl<K: Ord + std::fmt::Debug, V> RankTree<K, V> {
    /// Returns true if every structural invariant holds.
    pub fn check_invariants(&self) -> bool {
        self.check_invariants_detailed().is_ok()
    }

    /// Check every structural invariant, reporting the first violation.
    ///
    /// # Errors
    ///
    /// Returns a description of the violated invariant.
    pub fn check_invariants_detailed(&self) -> Result<(), String> {
        let report = self.check_subtree(self.root, true)?;

        if report.weight != self.len() {
            return Err(format!(
                "root weight {} disagrees with walked entry count {}",
                self.len(),
                report.weight
            ));
        }
        if report.leaf_pages != self.leaves.allocated_count() {
            return Err(format!(
                "tree reaches {} leaves but the arena holds {}",
                report.leaf_pages,
                self.leaves.allocated_count()
            ));
        }
        if report.branch_pages != self.branches.allocated_count() {
            return Err(format!(
                "tree reaches {} branches but the arena holds {}",
                report.branch_pages,
                self.branches.allocated_count()
            ));
        }

        self.check_leaf_chain()
    }

    /// Recursive walk. `rightmost` tracks whether this page sits on the
    /// rightmost spine of the tree, which exempts it from occupancy floors.
    fn check_subtree(&self, page: PageRef, rightmost: bool) -> Result<SubtreeReport<'_, K>, String> {
        match page {
            PageRef::Leaf(id) => {
                let leaf = self
                    .leaf(id)
                    .ok_or_else(|| format!("leaf {} is referenced but not allocated", id))?;
                if leaf.keys.len() != leaf.values.len() {
                    return Err(format!(
                        "leaf {} holds {} keys but {} values",
                        id,
                        leaf.keys.len(),
                        leaf.values.len()
                    ));
                }
                if leaf.keys.len() > self.max_keys() {
                    return Err(format!(
                        "leaf {} holds {} keys, above the maximum {}",
                        id,
                        leaf.keys.len(),
                        self.max_keys()
                    ));
                }
                let is_root = matches!(self.root, PageRef::Leaf(root) if root == id);
                if !rightmost && !is_root && leaf.keys.len() < self.leaf_floor() {
                    return Err(format!(
                        "non-rightmost leaf {} holds {} keys, below the floor {}",
                        id,
                        leaf.keys.len(),
                        self.leaf_floor()
                    ));
                }
                if !is_root && leaf.keys.is_empty() {
                    return Err(format!("non-root leaf {} is empty", id));
                }
                // Non-decreasing admits duplicate keys.
                if leaf.keys.windows(2).any(|pair| pair[0] > pair[1]) {
                    return Err(format!("leaf {} keys are out of order", id));
                }
                Ok(SubtreeReport {
                    first_key: leaf.keys.first(),
                    last_key: leaf.keys.last(),
                    weight: leaf.keys.len(),
                    depth: 0,
                    leaf_pages: 1,
                    branch_pages: 0,
                })
            }
            PageRef::Branch(id) => {
                let branch = self
                    .branch(id)
                    .ok_or_else(|| format!("branch {} is referenced but not allocated", id))?;
                if branch.children.is_empty() {
                    return Err(format!("branch {} has no children", id));
                }
                if branch.children.len() != branch.keys.len() + 1 {
                    return Err(format!(
                        "branch {} holds {} keys but {} children",
                        id,
                        branch.keys.len(),
                        branch.children.len()
                    ));
                }
                if branch.keys.len() > self.max_keys() {
                    return Err(format!(
                        "branch {} holds {} keys, above the maximum {}",
                        id,
                        branch.keys.len(),
                        self.max_keys()
                    ));
                }
                let is_root = matches!(self.root, PageRef::Branch(root) if root == id);
                if is_root && branch.keys.is_empty() {
                    return Err(format!("root branch {} holds no keys", id));
                }
                // A rightmost non-root branch may legally hold zero keys
                // after its only sibling subtree was demoted away.
                if !rightmost && !is_root && branch.keys.len() < self.branch_floor() {
                    return Err(format!(
                        "non-rightmost branch {} holds {} keys, below the floor {}",
                        id,
                        branch.keys.len(),
                        self.branch_floor()
                    ));
                }
                if branch.keys.windows(2).any(|pair| pair[0] > pair[1]) {
                    return Err(format!("branch {} keys are out of order", id));
                }

                let mut weight = 0usize;
                let mut leaf_pages = 0usize;
                let mut branch_pages = 1usize;
                let mut depth = None;
                let mut first_key = None;
                let mut prev_last: Option<&K> = None;
                let last_index = branch.children.len() - 1;

                for (index, child) in branch.children.iter().enumerate() {
                    let child_report =
                        self.check_subtree(*child, rightmost && index == last_index)?;
                    if index == 0 {
                        first_key = child_report.first_key;
                    }

                    match depth {
                        None => depth = Some(child_report.depth),
                        Some(expected) if expected != child_report.depth => {
                            return Err(format!(
                                "branch {} children sit at depths {} and {}",
                                id, expected, child_report.depth
                            ));
                        }
                        Some(_) => {}
                    }

                    if index > 0 {
                        let pivot = &branch.keys[index - 1];
                        // The pivot is a cached copy of the first key of this
                        // child's leftmost descendant leaf.
                        match child_report.first_key {
                            Some(first) if first == pivot => {}
                            Some(first) => {
                                return Err(format!(
                                    "branch {} pivot {} is {:?} but child {} starts at {:?}",
                                    id,
                                    index - 1,
                                    pivot,
                                    index,
                                    first
                                ));
                            }
                            None => {}
                        }
                        if let Some(prev) = prev_last {
                            if prev > pivot {
                                return Err(format!(
                                    "branch {} child {} ends at {:?}, past pivot {:?}",
                                    id,
                                    index - 1,
                                    prev,
                                    pivot
                                ));
                            }
                        }
                    }

                    weight += child_report.weight;
                    leaf_pages += child_report.leaf_pages;
                    branch_pages += child_report.branch_pages;
                    if child_report.last_key.is_some() {
                        prev_last = child_report.last_key;
                    }
                }

                if branch.weight != weight {
                    return Err(format!(
                        "branch {} caches weight {} but its subtrees hold {}",
                        id, branch.weight, weight
                    ));
                }

                Ok(SubtreeReport {
                    first_key,
                    last_key: prev_last,
                    weight,
                    depth: depth.unwrap_or(0) + 1,
                    leaf_pages,
                    branch_pages,
                })
            }
        }
    }

    /// Verify the leaf chain: complete, correctly double-linked, and
    /// consistent with both extreme caches.
    fn check_leaf_chain(&self) -> Result<(), String> {
        let mut id = self.first_leaf_id();
        let mut prev = NULL_PAGE;
        let mut visited = 0usize;
        let mut walked_weight = 0usize;

        while id != NULL_PAGE {
            let leaf = self
                .leaf(id)
                .ok_or_else(|| format!("leaf chain references freed page {}", id))?;
            if leaf.prev != prev {
                return Err(format!(
                    "leaf {} back-links to {} instead of {}",
                    id, leaf.prev, prev
                ));
            }
            visited += 1;
            walked_weight += leaf.len();
            if visited > self.leaves.allocated_count() {
                return Err("leaf chain is longer than the arena (cycle?)".to_string());
            }
            prev = id;
            id = leaf.next;
        }

        if prev != self.last_leaf_id() {
            return Err(format!(
                "leaf chain ends at {} but the cache says {}",
                prev,
                self.last_leaf_id()
            ));
        }
        if visited != self.leaves.allocated_count() {
            return Err(format!(
                "leaf chain visits {} pages but the arena holds {}",
                visited,
                self.leaves.allocated_count()
            ));
        }
        if walked_weight != self.len() {
            return Err(format!(
                "leaf chain holds {} entries but the root weight says {}",
                walked_weight,
                self.len()
            ));
        }
        Ok(())
    }
}

// ============================================================================
// DEBUG INSPECTION
// ============================================================================

impl<K, V> RankTree<K, V> {
    /// Entry counts of each leaf, left to right along the chain.
    pub fn leaf_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::new();
        let mut id = self.first_leaf_id();
        while id != NULL_PAGE {
            match self.leaf(id) {
                Some(leaf) => {
                    sizes.push(leaf.len());
                    id = leaf.next;
                }
                None => break,
            }
        }
        sizes
    }
}

impl<K: std::fmt::Debug, V> RankTree<K, V> {
    /// Dump the leaf chain to stdout. Debugging aid.
    pub fn print_page_chain(&self) {
        let mut id = self.first_leaf_id();
        while id != NULL_PAGE {
            match self.leaf(id) {
                Some(leaf) => {
                    println!("leaf {}: {:?}", id, leaf.keys);
                    id = leaf.next;
                }
                None => break,
            }
        }
    }
}
