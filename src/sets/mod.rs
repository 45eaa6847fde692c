//! Containers used by the neighborhood search.
//!
//! # Submodules
//!
//! - [`layers`]: Growable arrays holding one breadth-first layer each
//! - [`ordered`]: Balanced search tree collecting the neighbors that were found
//! - [`visited`]: Hash sets recording which k-mers the search has already reached

pub mod layers;
pub mod ordered;
pub mod visited;
