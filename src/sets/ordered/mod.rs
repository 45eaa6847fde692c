//! Self-balancing ordered set with order statistics.
//!
//! Nodes live in an arena and are addressed by [`NodeRef`] handles. Every node
//! caches the height and the size of its subtree, which keeps the tree AVL
//! balanced and answers rank/select queries in `O(log n)`.

mod capability;
mod iter;
mod ordered_set;

pub use capability::*;
pub use iter::*;
pub use ordered_set::*;
