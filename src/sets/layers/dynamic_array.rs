use std::mem;

use crate::{
    alloc::{AllocError, AllocPolicy},
    sets::ordered::Disposer,
};

/// Number of elements a [`DynamicArray`] starts with room for.
pub const DEFAULT_LAYER_CAPACITY: usize = 16;

/// Contiguous growable array with exact doubling growth.
///
/// The capacity is tracked by the array itself, so it always follows the
/// `c -> 2c` sequence (an empty capacity grows to 1) no matter how the
/// allocator rounds requests. Two arrays can trade their storage in `O(1)`
/// with [`swap`](DynamicArray::swap), which is how a breadth-first search
/// promotes its next layer to the current one.
///
/// # Examples
/// ```
/// use lsbucket::sets::layers::DynamicArray;
///
/// let mut current = DynamicArray::with_capacity(2).unwrap();
/// let mut next = DynamicArray::new().unwrap();
/// for x in 0..5u64 {
///     next.push(x).unwrap();
/// }
/// current.swap(&mut next);
/// assert_eq!(current.len(), 5);
/// assert_eq!(current.capacity(), 16);
/// assert!(next.is_empty());
/// ```
pub struct DynamicArray<T> {
    items: Vec<T>,
    capacity: usize,
    policy: AllocPolicy,
}

impl<T> DynamicArray<T> {
    pub fn new() -> Result<Self, AllocError> {
        DynamicArray::with_capacity(DEFAULT_LAYER_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Result<Self, AllocError> {
        DynamicArray::with_policy(capacity, AllocPolicy::default())
    }

    pub fn with_policy(capacity: usize, policy: AllocPolicy) -> Result<Self, AllocError> {
        let mut items = Vec::new();
        policy.reserve_exact(&mut items, capacity)?;
        Ok(DynamicArray {
            items,
            capacity,
            policy,
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends `item`, doubling the capacity first when the array is full.
    pub fn push(&mut self, item: T) -> Result<(), AllocError> {
        if self.items.len() == self.capacity {
            let capacity = (self.capacity * 2).max(1);
            let len = self.items.len();
            self.policy.reserve_exact(&mut self.items, capacity - len)?;
            self.capacity = capacity;
        }
        self.items.push(item);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Empties the array, keeping its capacity.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Empties the array, handing every element to `disposer` first.
    pub fn clear_with<D: Disposer<T>>(&mut self, mut disposer: D) {
        for item in self.items.drain(..) {
            disposer.dispose(item);
        }
    }

    /// Shrinks the capacity to exactly the current length.
    pub fn trim(&mut self) {
        self.items.shrink_to_fit();
        self.capacity = self.items.len();
    }

    /// Exchanges storage, capacity and length with `other` without touching
    /// any element.
    pub fn swap(&mut self, other: &mut DynamicArray<T>) {
        mem::swap(&mut self.items, &mut other.items);
        mem::swap(&mut self.capacity, &mut other.capacity);
    }

    /// Releases the array, handing every remaining element to `disposer`.
    pub fn dispose_with<D: Disposer<T>>(self, mut disposer: D) {
        for item in self.items {
            disposer.dispose(item);
        }
    }
}

impl<'a, T> IntoIterator for &'a DynamicArray<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for DynamicArray<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicArray")
            .field("capacity", &self.capacity)
            .field("items", &self.items)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;

    #[test]
    fn five_appends_from_capacity_two() {
        let mut array = DynamicArray::with_capacity(2).unwrap();
        let mut capacities = Vec::new();
        for x in 0..5 {
            array.push(x).unwrap();
            capacities.push(array.capacity());
        }
        assert_eq!(capacities, vec![2, 2, 4, 4, 8]);
        assert_eq!(array.len(), 5);
        assert_eq!(array.as_slice(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn full_array_doubles_through_its_policy() {
        let mut array = DynamicArray::with_policy(4, AllocPolicy::fail_fast()).unwrap();
        for x in 0..4u64 {
            array.push(x).unwrap();
        }
        assert_eq!(array.len(), array.capacity());
        array.push(4).unwrap();
        assert_eq!(array.capacity(), 8);
        assert_eq!(array.as_slice(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn default_capacity_is_sixteen() {
        let array: DynamicArray<u64> = DynamicArray::new().unwrap();
        assert_eq!(array.capacity(), 16);
        assert!(array.is_empty());
    }

    #[test]
    fn length_counts_every_append() {
        let mut array = DynamicArray::with_capacity(3).unwrap();
        for x in 0..1000u32 {
            array.push(x).unwrap();
        }
        assert_eq!(array.len(), 1000);
        assert_eq!(array.capacity(), 1536);
        assert_eq!(array.get(999), Some(&999));
        assert_eq!(array.get(1000), None);
    }

    #[test]
    fn zero_capacity_grows_to_one() {
        let mut array = DynamicArray::with_capacity(0).unwrap();
        array.push('a').unwrap();
        assert_eq!(array.capacity(), 1);
        array.push('b').unwrap();
        assert_eq!(array.capacity(), 2);
    }

    #[test]
    fn double_swap_restores_both_arrays() {
        let mut a = DynamicArray::with_capacity(2).unwrap();
        let mut b = DynamicArray::with_capacity(8).unwrap();
        for x in 0..3 {
            a.push(x).unwrap();
        }
        b.push(100).unwrap();

        a.swap(&mut b);
        assert_eq!(a.as_slice(), &[100]);
        assert_eq!(a.capacity(), 8);
        assert_eq!(b.as_slice(), &[0, 1, 2]);
        assert_eq!(b.capacity(), 4);

        a.swap(&mut b);
        assert_eq!(a.as_slice(), &[0, 1, 2]);
        assert_eq!(a.capacity(), 4);
        assert_eq!(b.as_slice(), &[100]);
        assert_eq!(b.capacity(), 8);
    }

    #[test]
    fn clear_with_disposes_each_element_once() {
        let mut array = DynamicArray::with_capacity(4).unwrap();
        for x in 1..=3 {
            array.push(x).unwrap();
        }
        let mut disposed = Vec::new();
        array.clear_with(|x: i32| disposed.push(x));
        assert_eq!(disposed, vec![1, 2, 3]);
        assert!(array.is_empty());
        assert_eq!(array.capacity(), 4);
    }

    #[test]
    fn clear_drops_elements() {
        let shared = Rc::new(());
        let mut array = DynamicArray::with_capacity(2).unwrap();
        array.push(Rc::clone(&shared)).unwrap();
        array.push(Rc::clone(&shared)).unwrap();
        assert_eq!(Rc::strong_count(&shared), 3);
        array.clear();
        assert_eq!(Rc::strong_count(&shared), 1);
    }

    #[test]
    fn trim_shrinks_to_length() {
        let mut array = DynamicArray::with_capacity(64).unwrap();
        for x in 0..5 {
            array.push(x).unwrap();
        }
        array.trim();
        assert_eq!(array.capacity(), 5);
        array.push(5).unwrap();
        assert_eq!(array.capacity(), 10);
        assert_eq!(array.len(), 6);
    }

    #[test]
    fn dispose_with_releases_remaining_elements() {
        let mut array = DynamicArray::with_capacity(2).unwrap();
        for x in ["a", "b", "c"] {
            array.push(x.to_string()).unwrap();
        }
        let mut disposed = Vec::new();
        array.dispose_with(|s: String| disposed.push(s));
        assert_eq!(disposed, vec!["a", "b", "c"]);
    }

    #[test]
    fn iterates_in_insertion_order() {
        let mut array = DynamicArray::with_capacity(1).unwrap();
        for x in [3, 1, 2] {
            array.push(x).unwrap();
        }
        let seen: Vec<_> = (&array).into_iter().copied().collect();
        assert_eq!(seen, vec![3, 1, 2]);
        assert_eq!(array.iter().sum::<i32>(), 6);
    }
}
