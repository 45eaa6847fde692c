//! Visited-key tracking for breadth-first exploration.
//!
//! [`KeySet`] is the open-addressing table the neighbor enumeration uses by
//! default; any [`VisitorSet`] implementation can stand in for it.

mod hashset;
mod key_set;
mod visitor_set;

pub use key_set::*;
pub use visitor_set::*;
