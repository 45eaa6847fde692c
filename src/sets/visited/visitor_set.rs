use crate::alloc::{AllocError, AllocPolicy};

/// A growable set of 64-bit keys remembering which ones were already seen.
pub trait VisitorSet: Sized {
    fn empty(policy: AllocPolicy) -> Result<Self, AllocError>;

    fn get(&self, key: u64) -> bool;

    /// Marks `key` as visited, returning `true` if it was not visited before.
    fn set(&mut self, key: u64) -> Result<bool, AllocError>;

    fn visited(&self) -> usize;
}
