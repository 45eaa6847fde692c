//! Growable arrays used as breadth-first layers.

mod dynamic_array;

pub use dynamic_array::*;
