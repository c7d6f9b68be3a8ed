//! Slab-style page storage.
//!
//! Pages are held in a `Vec<T>` addressed by `u32` ids, with a free list for
//! slot reuse and a mask tracking which slots are live. Parent-to-child and
//! sibling-to-sibling references are both plain ids into an arena, which keeps
//! ownership (parent frees child) separate from linkage (siblings point at
//! each other) during page destruction.

use std::convert::TryFrom;

/// Page ID type for arena-based allocation.
pub type PageId = u32;

/// Sentinel id meaning "no page".
pub const NULL_PAGE: PageId = u32::MAX;

/// Statistics for a page arena.
#[derive(Debug, Clone, Copy)]
pub struct ArenaStats {
    pub allocated_count: usize,
    pub free_count: usize,
    pub total_capacity: usize,
}

/// Arena allocator backing leaf and branch pages.
#[derive(Debug)]
pub struct PageArena<T> {
    storage: Vec<T>,
    free_list: Vec<usize>,
    live: Vec<bool>,
}

impl<T> PageArena<T> {
    /// Create a new empty arena.
    pub fn new() -> Self {
        Self {
            storage: Vec::new(),
            free_list: Vec::new(),
            live: Vec::new(),
        }
    }

    /// Allocate a page and return its id.
    #[inline]
    pub fn allocate(&mut self, page: T) -> PageId {
        let index = if let Some(free_index) = self.free_list.pop() {
            self.storage[free_index] = page;
            self.live[free_index] = true;
            free_index
        } else {
            let index = self.storage.len();
            self.storage.push(page);
            self.live.push(true);
            index
        };
        PageId::try_from(index).expect("page index exceeds id range")
    }

    /// Free a page, returning its contents.
    #[inline]
    pub fn free(&mut self, id: PageId) -> Option<T>
    where
        T: Default,
    {
        let index = usize::try_from(id).ok()?;
        if !self.live.get(index).copied().unwrap_or(false) {
            return None;
        }
        self.live[index] = false;
        self.free_list.push(index);
        Some(std::mem::take(&mut self.storage[index]))
    }

    /// Get a reference to a live page.
    #[inline]
    pub fn get(&self, id: PageId) -> Option<&T> {
        let index = usize::try_from(id).ok()?;
        if self.live.get(index).copied().unwrap_or(false) {
            Some(&self.storage[index])
        } else {
            None
        }
    }

    /// Get a mutable reference to a live page.
    #[inline]
    pub fn get_mut(&mut self, id: PageId) -> Option<&mut T> {
        let index = usize::try_from(id).ok()?;
        if self.live.get(index).copied().unwrap_or(false) {
            Some(&mut self.storage[index])
        } else {
            None
        }
    }

    /// Get mutable references to two distinct live pages at once.
    ///
    /// Borrow/merge operations touch a page and its sibling in the same
    /// arena; `split_at_mut` gives disjoint access without unsafe code.
    pub fn get_pair_mut(&mut self, a: PageId, b: PageId) -> Option<(&mut T, &mut T)> {
        let ia = usize::try_from(a).ok()?;
        let ib = usize::try_from(b).ok()?;
        if ia == ib
            || !self.live.get(ia).copied().unwrap_or(false)
            || !self.live.get(ib).copied().unwrap_or(false)
        {
            return None;
        }
        if ia < ib {
            let (left, right) = self.storage.split_at_mut(ib);
            Some((&mut left[ia], &mut right[0]))
        } else {
            let (left, right) = self.storage.split_at_mut(ia);
            Some((&mut right[0], &mut left[ib]))
        }
    }

    /// Check if an id refers to a live page.
    pub fn contains(&self, id: PageId) -> bool {
        usize::try_from(id)
            .ok()
            .and_then(|index| self.live.get(index).copied())
            .unwrap_or(false)
    }

    /// Number of live pages.
    pub fn allocated_count(&self) -> usize {
        self.live.iter().filter(|&&l| l).count()
    }

    /// Number of free slots awaiting reuse.
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Arena statistics.
    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            allocated_count: self.allocated_count(),
            free_count: self.free_list.len(),
            total_capacity: self.storage.capacity(),
        }
    }

    /// Drop all pages and reset the arena.
    pub fn clear(&mut self) {
        self.storage.clear();
        self.live.clear();
        self.free_list.clear();
    }
}

impl<T> Default for PageArena<T> {
    fn default() -> Self {
        Self::new()
    }
}
