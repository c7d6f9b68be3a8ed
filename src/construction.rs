//! Construction and bulk loading for `RankTree`.
//!
//! Order validation happens here and nowhere else: a tree that exists always
//! has a legal order. Bulk loading builds the leaf chain left to right and
//! then stitches branch levels bottom-up, producing the same invariants the
//! insertion engine maintains.

use crate::arena::{PageArena, PageId, NULL_PAGE};
use crate::error::{Error, TreeResult};
use crate::types::{BranchPage, LeafPage, PageRef, RankTree, MAX_ORDER, MIN_ORDER};

/// Default fan-out bound for trees built without an explicit order.
pub const DEFAULT_ORDER: usize = 32;

impl<K, V> RankTree<K, V> {
    /// Create a tree with the given fan-out bound.
    ///
    /// # Arguments
    ///
    /// * `order` - Maximum children per branch; pages hold `order - 1` keys.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrder`] if `order` is outside
    /// `[MIN_ORDER, MAX_ORDER]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranktree::RankTree;
    ///
    /// let tree = RankTree::<i32, String>::new(16).unwrap();
    /// assert!(tree.is_empty());
    /// assert!(RankTree::<i32, String>::new(2).is_err());
    /// ```
    pub fn new(order: usize) -> TreeResult<Self> {
        if !(MIN_ORDER..=MAX_ORDER).contains(&order) {
            return Err(Error::invalid_order(order, MIN_ORDER, MAX_ORDER));
        }
        Ok(Self::with_order_unchecked(order))
    }

    /// Create a tree with [`DEFAULT_ORDER`].
    pub fn with_default_order() -> Self {
        Self::with_order_unchecked(DEFAULT_ORDER)
    }

    fn with_order_unchecked(order: usize) -> Self {
        let mut leaves = PageArena::new();
        let root_id = leaves.allocate(LeafPage::empty());
        Self {
            order,
            root: PageRef::Leaf(root_id),
            leaves,
            branches: PageArena::new(),
            first_leaf: root_id,
            last_leaf: root_id,
            stage: 0,
        }
    }
}

impl<K: Ord + Clone, V> RankTree<K, V> {
    /// Build a tree from entries already sorted by key, strictly ascending.
    ///
    /// Faster than repeated insertion: leaves are filled to capacity in one
    /// pass and branch levels are assembled bottom-up.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrder`] for a bad `order` and
    /// [`Error::UnsortedBulkLoad`] if a key is not strictly greater than its
    /// predecessor; in both cases no tree is built.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranktree::RankTree;
    ///
    /// let tree = RankTree::from_sorted_iter(4, (0..100).map(|i| (i, i * 2))).unwrap();
    /// assert_eq!(tree.len(), 100);
    /// assert_eq!(tree.get_by_rank(50), Some((&50, &100)));
    /// ```
    pub fn from_sorted_iter<I>(order: usize, entries: I) -> TreeResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Self::bulk_load(order, entries, false)
    }

    /// Bulk load, optionally admitting equal adjacent keys (multimap use).
    pub(crate) fn bulk_load<I>(order: usize, entries: I, allow_dups: bool) -> TreeResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut tree = Self::new(order)?;
        let max_keys = tree.max_keys();

        // Fill the leaf chain left to right. The rightmost leaf is exempt
        // from the floor, so a short remainder leaf is legal as-is.
        let mut position = 0usize;
        let mut prev_key: Option<K> = None;
        let mut current = tree.first_leaf;
        for (key, value) in entries {
            if let Some(ref prev) = prev_key {
                let ordered = if allow_dups { *prev <= key } else { *prev < key };
                if !ordered {
                    return Err(Error::unsorted_bulk_load(position));
                }
            }
            prev_key = Some(key.clone());

            if tree
                .leaf(current)
                .map(|leaf| leaf.len() == max_keys)
                .unwrap_or(false)
            {
                let fresh = tree.leaves.allocate(LeafPage::empty());
                if let Some((old, new)) = tree.leaves.get_pair_mut(current, fresh) {
                    old.next = fresh;
                    new.prev = current;
                }
                current = fresh;
            }
            if let Some(leaf) = tree.leaf_mut(current) {
                leaf.keys.push(key);
                leaf.values.push(value);
            }
            position += 1;
        }
        tree.last_leaf = current;

        // Stitch branch levels bottom-up until a single page remains. Each
        // level entry carries the first key of its subtree for use as the
        // pivot one level up.
        let mut level: Vec<(K, PageRef, usize)> = Vec::new();
        let mut id = tree.first_leaf;
        while id != NULL_PAGE {
            let leaf = tree.leaf(id).ok_or_else(|| {
                Error::corrupted_tree("bulk load", "leaf chain references a freed page")
            })?;
            if let Some(first) = leaf.keys.first() {
                level.push((first.clone(), PageRef::Leaf(id), leaf.len()));
            }
            id = leaf.next;
        }

        while level.len() > 1 {
            level = tree.build_branch_level(level);
        }
        if let Some(&(_, root, _)) = level.first() {
            tree.root = root;
        }
        Ok(tree)
    }

    /// Group one level of pages into parent branches.
    fn build_branch_level(
        &mut self,
        children: Vec<(K, PageRef, usize)>,
    ) -> Vec<(K, PageRef, usize)> {
        // A trailing group of one child would make a keyless branch; steal a
        // child from the left neighbor group instead.
        let n = children.len();
        let mut sizes: Vec<usize> = Vec::new();
        let mut remaining = n;
        while remaining > self.order {
            sizes.push(self.order);
            remaining -= self.order;
        }
        if remaining == 1 && !sizes.is_empty() {
            let last_full = sizes.len() - 1;
            sizes[last_full] -= 1;
            remaining += 1;
        }
        sizes.push(remaining);

        let mut parents = Vec::with_capacity(sizes.len());
        let mut iter = children.into_iter();
        for size in sizes {
            let mut branch = BranchPage::empty();
            let mut subtree_first: Option<K> = None;
            for _ in 0..size {
                let (first, page, weight) = match iter.next() {
                    Some(entry) => entry,
                    None => break,
                };
                if branch.children.is_empty() {
                    subtree_first = Some(first);
                } else {
                    branch.keys.push(first);
                }
                branch.children.push(page);
                branch.weight += weight;
            }
            let weight = branch.weight;
            let id = self.branches.allocate(branch);
            if let Some(first) = subtree_first {
                parents.push((first, PageRef::Branch(id), weight));
            }
        }
        parents
    }
}

impl<K, V> Default for RankTree<K, V> {
    /// Create a tree with the default order.
    fn default() -> Self {
        Self::with_default_order()
    }
}
