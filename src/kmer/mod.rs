//! Packed DNA sequences and the sequence operations the search is built on.
//!
//! A k-mer is stored in a `u64`, two bits per symbol. Keys carrying
//! [`SHORT_FLAG`] hold a (k-1)-mer, which is how the breadth-first search
//! represents the intermediate result of a deletion.

mod buckets;
mod edit_distance;
mod encoding;
mod random;
mod sampling;

pub use buckets::*;
pub use edit_distance::*;
pub use encoding::*;
pub use random::*;
pub use sampling::*;
