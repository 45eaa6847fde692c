use crate::sets::ordered::{Comparator, Disposer, OrderedSet};

/// Whether the two neighborhoods share at least one element.
///
/// Every element of `a` is looked up in `b`, so pass the smaller set first.
pub fn has_collision<T, C, D>(a: &OrderedSet<T, C, D>, b: &OrderedSet<T, C, D>) -> bool
where
    C: Comparator<T>,
    D: Disposer<T>,
{
    a.iter().any(|element| b.contains(element))
}
