//! Collision statistics for pairs of k-mers at a fixed edit distance.
//!
//! [`run_trial`] draws one pair and tests whether their neighborhoods
//! intersect; [`Stats`] accumulates the outcomes and renders them as
//! tab-separated tables or JSON.

mod stats;
mod trial;

pub use stats::*;
pub use trial::*;
