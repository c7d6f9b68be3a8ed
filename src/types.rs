//! Core types and data structures for the rank-tracking B+ tree.
//!
//! This module defines the tree itself, its two page kinds, and the small
//! helpers every other module leans on: arena access, occupancy limits, and
//! the weight bookkeeping that keeps rank queries logarithmic.

use crate::arena::{ArenaStats, PageArena, PageId, NULL_PAGE};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Minimum order (fan-out bound) for any tree.
///
/// Order 4 gives 3 keys per page and a leaf floor of 2, the smallest
/// configuration where a removal cannot empty a non-rightmost leaf before
/// underflow repair runs.
pub const MIN_ORDER: usize = 4;

/// Maximum order for any tree.
pub const MAX_ORDER: usize = 512;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Reference to a page in one of the two arenas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRef {
    Leaf(PageId),
    Branch(PageId),
}

impl PageRef {
    /// Return the raw page id.
    pub fn id(&self) -> PageId {
        match *self {
            PageRef::Leaf(id) => id,
            PageRef::Branch(id) => id,
        }
    }

    /// Returns true if this reference points to a leaf page.
    pub fn is_leaf(&self) -> bool {
        matches!(self, PageRef::Leaf(_))
    }
}

/// Leaf page holding keys and their payloads, linked to both siblings.
///
/// The payload is whatever `V` is: `()` for sets, a value for dictionaries.
/// Multimaps store duplicate keys in adjacent slots.
#[derive(Debug, Clone)]
pub struct LeafPage<K, V> {
    /// Sorted keys.
    pub(crate) keys: Vec<K>,
    /// Payloads, parallel to `keys`.
    pub(crate) values: Vec<V>,
    /// Right sibling in the leaf chain, `NULL_PAGE` for the rightmost leaf.
    pub(crate) next: PageId,
    /// Left sibling in the leaf chain, `NULL_PAGE` for the leftmost leaf.
    pub(crate) prev: PageId,
}

/// Branch page routing searches and carrying the subtree weight.
///
/// Key `i` is a cached copy of child `i + 1`'s leftmost-descendant-leaf first
/// key (a pivot, not independent data). `weight` counts the leaf-level keys
/// in the whole subtree.
#[derive(Debug, Clone)]
pub struct BranchPage<K> {
    /// Sorted separator keys.
    pub(crate) keys: Vec<K>,
    /// Children, always one more than `keys`.
    pub(crate) children: Vec<PageRef>,
    /// Total leaf-level keys below this page.
    pub(crate) weight: usize,
}

/// In-memory ordered associative container engine.
///
/// A B+ tree storing all entries in linked leaves, with per-subtree weights
/// maintained through every split, borrow and merge so that rank queries
/// (`get_by_rank`, `rank_of_key`) run in O(log n).
///
/// This is the core the `RankMap` / `RankSet` / `RankMultimap` façades wrap;
/// it can also be used directly.
///
/// # Examples
///
/// ```
/// use ranktree::RankTree;
///
/// let mut tree = RankTree::with_default_order();
/// tree.insert(2, "two");
/// tree.insert(1, "one");
/// tree.insert(3, "three");
///
/// assert_eq!(tree.get(&2), Some(&"two"));
/// assert_eq!(tree.get_by_rank(1), Some((&2, &"two")));
/// assert_eq!(tree.rank_of_key(&3), Some(2));
/// ```
#[derive(Debug)]
pub struct RankTree<K, V> {
    /// Fan-out bound: maximum children per branch; keys per page = order - 1.
    pub(crate) order: usize,
    /// The root page, a leaf until the first split.
    pub(crate) root: PageRef,
    /// Arena storage for leaf pages.
    pub(crate) leaves: PageArena<LeafPage<K, V>>,
    /// Arena storage for branch pages.
    pub(crate) branches: PageArena<BranchPage<K>>,
    /// Cached leftmost leaf, for O(1) min and forward iteration.
    pub(crate) first_leaf: PageId,
    /// Cached rightmost leaf, for O(1) max and the append fast path.
    pub(crate) last_leaf: PageId,
    /// Mutation counter; every structural or payload mutation increments it.
    pub(crate) stage: u64,
}

// ============================================================================
// OCCUPANCY LIMITS AND WEIGHT HELPERS
// ============================================================================

impl<K, V> RankTree<K, V> {
    /// The fan-out bound this tree was built with.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Maximum keys a page may hold.
    #[inline]
    pub(crate) fn max_keys(&self) -> usize {
        self.order - 1
    }

    /// Minimum keys for a non-rightmost leaf: ceil((order - 1) / 2).
    #[inline]
    pub(crate) fn leaf_floor(&self) -> usize {
        self.order / 2
    }

    /// Minimum keys for a non-rightmost, non-root branch: floor((order - 1) / 2).
    #[inline]
    pub(crate) fn branch_floor(&self) -> usize {
        (self.order - 1) / 2
    }

    /// Number of entries in the tree, read off the root weight in O(1).
    pub fn len(&self) -> usize {
        self.page_weight(self.root)
    }

    /// Returns true if the tree holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Leaf-level key count of the subtree under `page`.
    #[inline]
    pub(crate) fn page_weight(&self, page: PageRef) -> usize {
        match page {
            PageRef::Leaf(id) => self.leaf(id).map(|leaf| leaf.keys.len()).unwrap_or(0),
            PageRef::Branch(id) => self.branch(id).map(|branch| branch.weight).unwrap_or(0),
        }
    }

    // ========================================================================
    // CHANGE DETECTION
    // ========================================================================

    /// Current value of the mutation counter.
    ///
    /// Captured by enumerators; compare with [`check_stage`](Self::check_stage)
    /// before touching the structure again.
    pub fn stage(&self) -> u64 {
        self.stage
    }

    /// Fails with [`Error::TreeModified`](crate::Error::TreeModified) if the
    /// tree has been mutated since `captured` was taken.
    pub fn check_stage(&self, captured: u64) -> crate::TreeResult<()> {
        if self.stage == captured {
            Ok(())
        } else {
            Err(crate::Error::TreeModified)
        }
    }

    /// Bump the mutation counter. Called by every mutator.
    #[inline]
    pub(crate) fn touch(&mut self) {
        self.stage = self.stage.wrapping_add(1);
    }

    // ========================================================================
    // ARENA ACCESS
    // ========================================================================

    /// Get a reference to a leaf page.
    #[inline]
    pub(crate) fn leaf(&self, id: PageId) -> Option<&LeafPage<K, V>> {
        self.leaves.get(id)
    }

    /// Get a mutable reference to a leaf page.
    #[inline]
    pub(crate) fn leaf_mut(&mut self, id: PageId) -> Option<&mut LeafPage<K, V>> {
        self.leaves.get_mut(id)
    }

    /// Get a reference to a branch page.
    #[inline]
    pub(crate) fn branch(&self, id: PageId) -> Option<&BranchPage<K>> {
        self.branches.get(id)
    }

    /// Get a mutable reference to a branch page.
    #[inline]
    pub(crate) fn branch_mut(&mut self, id: PageId) -> Option<&mut BranchPage<K>> {
        self.branches.get_mut(id)
    }

    /// Id of the leftmost leaf (O(1), cached).
    pub(crate) fn first_leaf_id(&self) -> PageId {
        self.first_leaf
    }

    /// Id of the rightmost leaf (O(1), cached).
    pub(crate) fn last_leaf_id(&self) -> PageId {
        self.last_leaf
    }

    /// Statistics for the leaf page arena.
    pub fn leaf_arena_stats(&self) -> ArenaStats {
        self.leaves.stats()
    }

    /// Statistics for the branch page arena.
    pub fn branch_arena_stats(&self) -> ArenaStats {
        self.branches.stats()
    }

    /// Number of leaf pages currently in the tree.
    pub fn leaf_count(&self) -> usize {
        self.leaves.allocated_count()
    }
}

impl<K, V> RankTree<K, V> {
    /// Clear all entries, keeping the order.
    pub fn clear(&mut self) {
        self.leaves.clear();
        self.branches.clear();
        let root_id = self.leaves.allocate(LeafPage::empty());
        self.root = PageRef::Leaf(root_id);
        self.first_leaf = root_id;
        self.last_leaf = root_id;
        self.touch();
    }
}

// Manual impls: the derive would demand `K: Default` just to produce empty
// vectors, and `free` swaps a default page into the vacated slot.
impl<K, V> Default for LeafPage<K, V> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<K> Default for BranchPage<K> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<K, V> LeafPage<K, V> {
    /// A fresh unlinked leaf.
    pub(crate) fn empty() -> Self {
        Self {
            keys: Vec::new(),
            values: Vec::new(),
            next: NULL_PAGE,
            prev: NULL_PAGE,
        }
    }

    /// Number of entries in this leaf.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }
}

impl<K> BranchPage<K> {
    /// A fresh branch with no keys or children.
    pub(crate) fn empty() -> Self {
        Self {
            keys: Vec::new(),
            children: Vec::new(),
            weight: 0,
        }
    }

    /// Number of separator keys in this branch.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }
}
