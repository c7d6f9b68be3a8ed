//! Ordered associative containers with O(log n) rank queries.
//!
//! The core is [`RankTree`], a B+ tree holding every entry in doubly linked
//! leaf pages, with a weight on each branch counting the entries below it.
//! The weights turn positional questions that cost O(n) on a plain ordered
//! map into descents:
//!
//! * [`RankTree::get_by_rank`] / [`RankTree::remove_by_rank`] - the k-th
//!   entry in key order
//! * [`RankTree::rank_of_key`] - how many keys precede this one
//!
//! Three façades narrow the core to familiar shapes: [`RankMap`] (unique
//! keys), [`RankSet`] (elements only), and [`RankMultimap`] (duplicate keys
//! in arrival order).
//!
//! # Examples
//!
//! ```
//! use ranktree::RankMap;
//!
//! let mut board: RankMap<u32, &str> = RankMap::new();
//! board.insert(1500, "ada");
//! board.insert(1320, "bob");
//! board.insert(1410, "cat");
//!
//! // Who is in second place (ascending order)?
//! assert_eq!(board.get_by_rank(1), Some((&1410, &"cat")));
//! // How many players score below 1500?
//! assert_eq!(board.rank_lower_bound(&1500), 2);
//! ```
//!
//! Pages live in two arenas indexed by `u32` ids, so the tree allocates per
//! page rather than per entry and iteration walks the leaf chain without
//! touching the branches. Borrowed iterators ([`RankTree::iter`],
//! [`RankTree::range`]) pin the tree; the detached [`Cursor`] instead
//! captures a stage counter and fails with [`Error::TreeModified`] when used
//! across a mutation.

mod arena;
mod construction;
mod delete;
mod error;
mod get;
mod insert;
mod iter;
mod map;
mod multimap;
mod node;
mod path;
mod rank;
mod set;
mod types;
mod validation;

pub use arena::{ArenaStats, PageId, NULL_PAGE};
pub use construction::DEFAULT_ORDER;
pub use error::{Error, TreeResult};
pub use iter::{Cursor, Iter, Keys, Range, RevIter, Values};
pub use map::RankMap;
pub use path::Path;
pub use multimap::{MultiValues, RankMultimap};
pub use set::{RankSet, SetRange};
pub use types::{RankTree, MAX_ORDER, MIN_ORDER};
