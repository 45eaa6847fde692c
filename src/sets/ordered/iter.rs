use std::iter::FusedIterator;

use crate::sets::ordered::ordered_set::{Slot, occupied};

/// In-order iterator over an [`OrderedSet`](super::OrderedSet).
///
/// Holds the chain of pending ancestors on an explicit stack, so it never uses
/// more than `height` entries.
pub struct Iter<'a, T> {
    slots: &'a [Slot<T>],
    stack: Vec<u32>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(super) fn new(slots: &'a [Slot<T>], root: Option<u32>, len: usize) -> Self {
        let mut iter = Iter {
            slots,
            stack: Vec::new(),
            remaining: len,
        };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut link: Option<u32>) {
        while let Some(index) = link {
            self.stack.push(index);
            link = occupied(self.slots, index).left;
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let index = self.stack.pop()?;
        let node = occupied(self.slots, index);
        self.push_left_spine(node.right);
        self.remaining -= 1;
        Some(&node.element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}
