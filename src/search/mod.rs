//! Neighborhood enumeration over the edit graph of k-mers.
//!
//! [`explore_neighborhood`] collects the r-neighborhood of a k-mer, and
//! [`has_collision`] tests whether two neighborhoods share a bucket.

mod collision;
mod neighborhood;

pub use collision::*;
pub use neighborhood::*;
