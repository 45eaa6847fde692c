use std::cmp::Ordering;

/// Ordering relation an [`OrderedSet`](super::OrderedSet) is built with.
///
/// `compare(stored, probe)` returns how the stored element sorts relative to
/// the probe. Any `Fn(&T, &T) -> Ordering` closure is a comparator.
pub trait Comparator<T> {
    fn compare(&self, stored: &T, probe: &T) -> Ordering;
}

impl<T, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    fn compare(&self, stored: &T, probe: &T) -> Ordering {
        self(stored, probe)
    }
}

/// Comparator for types with a total order of their own.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalOrder;

impl<T: Ord> Comparator<T> for NaturalOrder {
    fn compare(&self, stored: &T, probe: &T) -> Ordering {
        stored.cmp(probe)
    }
}

/// Action run exactly once on every element that leaves a container, whether
/// it is deleted individually or released by a teardown.
pub trait Disposer<T> {
    fn dispose(&mut self, element: T);
}

impl<T, F> Disposer<T> for F
where
    F: FnMut(T),
{
    fn dispose(&mut self, element: T) {
        self(element)
    }
}

/// Default disposer: the element is simply dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct DropElement;

impl<T> Disposer<T> for DropElement {
    fn dispose(&mut self, element: T) {
        drop(element)
    }
}
