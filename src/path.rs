//! Root-to-leaf path abstraction.
//!
//! Every mutation and rank query runs over a `Path`: a transient stack of
//! (branch, taken-child) frames built by descending search. Paths hold page
//! ids only, never borrows, so the engine can mutate pages while walking the
//! frames it recorded.
//!
//! The same frame stack gives three cheap derived operations: stepping to the
//! adjacent leaf at equal depth without re-searching from the root, locating
//! the pivot key that anchors the current leaf, and computing the rank of the
//! addressed slot from subtree weights.

use crate::arena::PageId;
use crate::types::{PageRef, RankTree};
use crate::{Error, TreeResult};

/// One descent step: the branch visited and the child index taken.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Frame {
    pub(crate) branch: PageId,
    pub(crate) child: usize,
}

/// A root-to-leaf path from a search, reused for mutation or rank queries.
///
/// A `Path` is scoped to one logical operation; it is invalidated by any
/// mutation other than the one it is passed to.
#[derive(Debug, Clone)]
pub struct Path {
    /// Branch frames from root down, excluding the leaf.
    pub(crate) frames: Vec<Frame>,
    /// The target leaf.
    pub(crate) leaf: PageId,
    /// Slot within the leaf: the hit, or the insertion point on a miss.
    pub(crate) slot: usize,
    /// Whether the searched key was present.
    pub(crate) found: bool,
}

impl Path {
    /// Whether the search that built this path hit its key exactly.
    pub fn found(&self) -> bool {
        self.found
    }

    /// Target slot within the target leaf.
    pub fn slot(&self) -> usize {
        self.slot
    }
}

impl<K: Ord + Clone, V> RankTree<K, V> {
    // ========================================================================
    // PATH CONSTRUCTION
    // ========================================================================

    /// Build a path to `key` (or its insertion point) by descending search.
    ///
    /// The path addresses the leftmost occurrence: branches route by lower
    /// bound, so the descent goes left of separators equal to `key` (with
    /// duplicates present, equal keys can end the left child). When that
    /// lands one past the end of a leaf, the same position is slot 0 of the
    /// right sibling; if the key sits there, the path is normalized onto it
    /// so removal from a duplicate-admitting tree stays deterministic.
    pub fn path_to_key(&self, key: &K) -> Path {
        let mut frames = Vec::new();
        let mut current = self.root;
        loop {
            match current {
                PageRef::Branch(id) => {
                    let Some(branch) = self.branch(id) else {
                        return Path { frames, leaf: crate::arena::NULL_PAGE, slot: 0, found: false };
                    };
                    let child = branch.route_lower(key);
                    frames.push(Frame { branch: id, child });
                    current = branch.children[child];
                }
                PageRef::Leaf(id) => {
                    let (slot, found, at_end) = match self.leaf(id) {
                        Some(leaf) => {
                            let slot = leaf.lower_bound(key);
                            let found = slot < leaf.len() && leaf.keys[slot] == *key;
                            (slot, found, slot == leaf.len())
                        }
                        None => (0, false, false),
                    };
                    let mut path = Path { frames, leaf: id, slot, found };
                    if at_end && self.next_leaf_starts_with(id, key) {
                        // `step_right` re-points the frames and marks the hit.
                        self.step_right(&mut path);
                    }
                    return path;
                }
            }
        }
    }

    /// Whether the right sibling of leaf `id` exists and begins with `key`.
    fn next_leaf_starts_with(&self, id: PageId, key: &K) -> bool {
        self.leaf(id)
            .and_then(|leaf| self.leaf(leaf.next))
            .and_then(|next| next.keys.first())
            .map_or(false, |first| first == key)
    }

    /// Build a path to the slot just past every key equal to `key`.
    ///
    /// Duplicate-admitting inserts use this so equal keys keep insertion
    /// order.
    pub(crate) fn path_to_key_upper(&self, key: &K) -> Path {
        let mut frames = Vec::new();
        let mut current = self.root;
        loop {
            match current {
                PageRef::Branch(id) => {
                    let Some(branch) = self.branch(id) else {
                        return Path { frames, leaf: crate::arena::NULL_PAGE, slot: 0, found: false };
                    };
                    let child = branch.route_upper(key);
                    frames.push(Frame { branch: id, child });
                    current = branch.children[child];
                }
                PageRef::Leaf(id) => {
                    let (slot, found) = match self.leaf(id) {
                        Some(leaf) => {
                            let slot = leaf.upper_bound(key);
                            (slot, slot > 0 && leaf.keys[slot - 1] == *key)
                        }
                        None => (0, false),
                    };
                    return Path { frames, leaf: id, slot, found };
                }
            }
        }
    }

    /// Build a path to the entry at `rank`, subtracting child weights while
    /// descending.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RankOutOfBounds`] if `rank >= len`.
    pub fn path_to_rank(&self, rank: usize) -> TreeResult<Path> {
        let len = self.len();
        if rank >= len {
            return Err(Error::rank_out_of_bounds(rank, len));
        }
        let mut frames = Vec::new();
        let mut current = self.root;
        let mut remaining = rank;
        loop {
            match current {
                PageRef::Branch(id) => {
                    let branch = self
                        .branch(id)
                        .ok_or_else(|| Error::corrupted_tree("rank descent", "missing branch"))?;
                    let mut child = branch.children.len() - 1;
                    for (index, page) in branch.children.iter().enumerate() {
                        let weight = self.page_weight(*page);
                        if remaining < weight {
                            child = index;
                            break;
                        }
                        remaining -= weight;
                    }
                    frames.push(Frame { branch: id, child });
                    current = branch.children[child];
                }
                PageRef::Leaf(id) => {
                    return Ok(Path { frames, leaf: id, slot: remaining, found: true });
                }
            }
        }
    }

    // ========================================================================
    // ADJACENT-LEAF STEPPING
    // ========================================================================

    /// Move `path` to the adjacent leaf on the right, at slot 0.
    ///
    /// Pops frames until one has a further sibling, then descends first
    /// children back to leaf depth: O(1) amortized over a full scan, never a
    /// re-search from the root. Returns the new leaf, or `None` at the
    /// rightmost leaf (path left unchanged).
    pub fn step_right(&self, path: &mut Path) -> Option<PageId> {
        let mut frames = path.frames.clone();
        match self.right_adjacent(&mut frames)? {
            PageRef::Leaf(id) => {
                path.frames = frames;
                path.leaf = id;
                path.slot = 0;
                path.found = true;
                Some(id)
            }
            PageRef::Branch(_) => None,
        }
    }

    /// Move `path` to the adjacent leaf on the left, at its last slot.
    ///
    /// Mirror of [`step_right`](Self::step_right), descending last children.
    pub fn step_left(&self, path: &mut Path) -> Option<PageId> {
        let mut frames = path.frames.clone();
        match self.left_adjacent(&mut frames)? {
            PageRef::Leaf(id) => {
                let len = self.leaf(id)?.len();
                path.frames = frames;
                path.leaf = id;
                path.slot = len.saturating_sub(1);
                path.found = true;
                Some(id)
            }
            PageRef::Branch(_) => None,
        }
    }

    /// Re-point a frame stack at the right-adjacent page at equal depth.
    ///
    /// The addressed page is the taken child of the last frame (the root for
    /// an empty stack, which has no siblings). On success the stack addresses
    /// the sibling and the sibling is returned; on failure the stack is
    /// garbage and must be discarded.
    pub(crate) fn right_adjacent(&self, frames: &mut Vec<Frame>) -> Option<PageRef> {
        let depth = frames.len();
        let mut pivot_depth = depth;
        loop {
            if pivot_depth == 0 {
                return None;
            }
            pivot_depth -= 1;
            let frame = frames[pivot_depth];
            if frame.child + 1 < self.branch(frame.branch)?.children.len() {
                break;
            }
        }
        frames.truncate(pivot_depth + 1);
        frames[pivot_depth].child += 1;
        let mut current =
            self.branch(frames[pivot_depth].branch)?.children[frames[pivot_depth].child];
        while frames.len() < depth {
            match current {
                PageRef::Branch(id) => {
                    frames.push(Frame { branch: id, child: 0 });
                    current = self.branch(id)?.children[0];
                }
                PageRef::Leaf(_) => break,
            }
        }
        Some(current)
    }

    /// Mirror of [`right_adjacent`](Self::right_adjacent), descending last
    /// children.
    pub(crate) fn left_adjacent(&self, frames: &mut Vec<Frame>) -> Option<PageRef> {
        let depth = frames.len();
        let mut pivot_depth = depth;
        loop {
            if pivot_depth == 0 {
                return None;
            }
            pivot_depth -= 1;
            if frames[pivot_depth].child > 0 {
                break;
            }
        }
        frames.truncate(pivot_depth + 1);
        frames[pivot_depth].child -= 1;
        let mut current =
            self.branch(frames[pivot_depth].branch)?.children[frames[pivot_depth].child];
        while frames.len() < depth {
            match current {
                PageRef::Branch(id) => {
                    let last = self.branch(id)?.children.len() - 1;
                    frames.push(Frame { branch: id, child: last });
                    current = self.branch(id)?.children[last];
                }
                PageRef::Leaf(_) => break,
            }
        }
        Some(current)
    }

    // ========================================================================
    // PIVOT ACCESS
    // ========================================================================

    /// Location of the pivot anchoring the addressed page: the key just left
    /// of the deepest frame with a non-zero child index.
    ///
    /// `None` means the addressed page is on the leftmost spine and has no
    /// pivot.
    pub(crate) fn pivot_location(frames: &[Frame]) -> Option<(PageId, usize)> {
        frames
            .iter()
            .rev()
            .find(|frame| frame.child > 0)
            .map(|frame| (frame.branch, frame.child - 1))
    }

    /// Clone of the pivot key anchoring the addressed page.
    pub(crate) fn pivot_key(&self, frames: &[Frame]) -> Option<K> {
        let (branch, index) = Self::pivot_location(frames)?;
        self.branch(branch).map(|page| page.keys[index].clone())
    }

    /// Overwrite the pivot anchoring the addressed page.
    ///
    /// No-op on the leftmost spine, which matches the convention that the
    /// leftmost subtree has no anchor.
    pub(crate) fn set_pivot(&mut self, frames: &[Frame], key: K) {
        if let Some((branch, index)) = Self::pivot_location(frames) {
            if let Some(page) = self.branch_mut(branch) {
                page.keys[index] = key;
            }
        }
    }

    // ========================================================================
    // WEIGHT MAINTENANCE AND RANK
    // ========================================================================

    /// Add `amount` to the weight of every branch on the frame stack.
    pub(crate) fn add_weights(&mut self, frames: &[Frame], amount: usize) {
        for frame in frames {
            if let Some(branch) = self.branch_mut(frame.branch) {
                branch.weight += amount;
            }
        }
    }

    /// Subtract `amount` from the weight of every branch on the frame stack.
    pub(crate) fn sub_weights(&mut self, frames: &[Frame], amount: usize) {
        for frame in frames {
            if let Some(branch) = self.branch_mut(frame.branch) {
                branch.weight -= amount;
            }
        }
    }

    /// Rank of the slot addressed by `path`.
    ///
    /// At each frame the cheaper half of the children is summed: weights left
    /// of the taken child directly, or the branch total minus the right part.
    /// Each frame costs O(fan-out), the walk O(log n).
    pub fn rank_of_path(&self, path: &Path) -> usize {
        let mut rank = path.slot;
        for frame in &path.frames {
            let Some(branch) = self.branch(frame.branch) else { continue };
            if frame.child * 2 <= branch.children.len() {
                for page in &branch.children[..frame.child] {
                    rank += self.page_weight(*page);
                }
            } else {
                let mut right = 0;
                for page in &branch.children[frame.child..] {
                    right += self.page_weight(*page);
                }
                rank += branch.weight - right;
            }
        }
        rank
    }
}
