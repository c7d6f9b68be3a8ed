//! Error handling and result types for ranktree operations.
//!
//! Every failure mode in this crate is local, synchronous, and fully
//! recoverable: an operation either completes or leaves the tree untouched.

/// Error type for tree operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Order passed at construction is outside `[MIN_ORDER, MAX_ORDER]`.
    InvalidOrder(String),
    /// Key already present where the container forbids duplicates.
    DuplicateKey,
    /// Key not found in the tree.
    KeyNotFound,
    /// Rank passed to an order-statistics query is out of `[0, len)`.
    RankOutOfBounds(String),
    /// The tree was mutated while a detached cursor was live.
    TreeModified,
    /// Bulk-load input was not sorted as required.
    UnsortedBulkLoad(String),
    /// Internal structure violation detected by validation.
    CorruptedTree(String),
}

impl Error {
    /// Create an `InvalidOrder` error with context.
    pub(crate) fn invalid_order(order: usize, min: usize, max: usize) -> Self {
        Self::InvalidOrder(format!(
            "order {} is invalid (allowed range: {}..={})",
            order, min, max
        ))
    }

    /// Create a `RankOutOfBounds` error with context.
    pub(crate) fn rank_out_of_bounds(rank: usize, len: usize) -> Self {
        Self::RankOutOfBounds(format!("rank {} out of bounds for length {}", rank, len))
    }

    /// Create an `UnsortedBulkLoad` error with context.
    pub(crate) fn unsorted_bulk_load(position: usize) -> Self {
        Self::UnsortedBulkLoad(format!("input out of order at element {}", position))
    }

    /// Create a `CorruptedTree` error with context.
    pub(crate) fn corrupted_tree(component: &str, details: &str) -> Self {
        Self::CorruptedTree(format!("{}: {}", component, details))
    }

    /// Check if this error is an order error.
    pub fn is_order_error(&self) -> bool {
        matches!(self, Self::InvalidOrder(_))
    }

    /// Check if this error reports a stale cursor.
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::TreeModified)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidOrder(msg) => write!(f, "invalid order: {}", msg),
            Error::DuplicateKey => write!(f, "key already present"),
            Error::KeyNotFound => write!(f, "key not found in tree"),
            Error::RankOutOfBounds(msg) => write!(f, "rank out of bounds: {}", msg),
            Error::TreeModified => write!(f, "tree modified during iteration"),
            Error::UnsortedBulkLoad(msg) => write!(f, "unsorted bulk load: {}", msg),
            Error::CorruptedTree(msg) => write!(f, "corrupted tree: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Result type for tree operations that may fail.
pub type TreeResult<T> = Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = Error::invalid_order(2, 4, 512);
        assert!(err.to_string().contains("order 2"));
        assert!(err.is_order_error());

        let err = Error::rank_out_of_bounds(9, 3);
        assert!(err.to_string().contains("length 3"));

        assert!(Error::TreeModified.is_stale());
        assert!(!Error::KeyNotFound.is_stale());
    }
}
