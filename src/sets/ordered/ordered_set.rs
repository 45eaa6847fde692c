use std::{
    cmp::Ordering,
    fmt::{self, Debug, Write},
    mem,
};

use crate::{
    alloc::{AllocError, AllocPolicy},
    sets::ordered::{Comparator, Disposer, DropElement, Iter, NaturalOrder},
};

type Link = Option<u32>;

/// Stable handle to a node of an [`OrderedSet`].
///
/// A handle outlives the node it names: once the node is deleted the handle is
/// stale, and every operation given a stale handle is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    index: u32,
    generation: u32,
}

pub(super) struct Node<T> {
    pub(super) left: Link,
    pub(super) right: Link,
    height: u32,
    size: u32,
    pub(super) element: T,
}

pub(super) struct Slot<T> {
    generation: u32,
    node: Option<Node<T>>,
}

pub(super) fn occupied<T>(slots: &[Slot<T>], index: u32) -> &Node<T> {
    match &slots[index as usize].node {
        Some(node) => node,
        None => unreachable!("vacant slot {index} is linked into the tree"),
    }
}

/// An AVL tree over opaque elements, ordered by an injected [`Comparator`].
///
/// Elements comparing `Equal` to a stored element are rejected on insert, so
/// the tree never holds two comparator-equal elements. Elements leaving the
/// tree (deletion, [`clear`](OrderedSet::clear), drop) are handed to the
/// [`Disposer`] exactly once.
///
/// Insertion and deletion record the root-to-target path in an ancestor
/// buffer and rebalance bottom-up along it, so auxiliary space is bounded by
/// the tree height.
///
/// # Examples
/// ```
/// use lsbucket::sets::ordered::OrderedSet;
///
/// let mut set = OrderedSet::new();
/// for x in [5, 3, 8, 1] {
///     set.insert(x).unwrap();
/// }
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![1, 3, 5, 8]);
/// assert_eq!(set.rank(&5), Some(2));
/// assert_eq!(set.select(0), Some(&1));
/// ```
pub struct OrderedSet<T, C = NaturalOrder, D = DropElement>
where
    D: Disposer<T>,
{
    slots: Vec<Slot<T>>,
    vacant: Vec<u32>,
    root: Link,
    path: Vec<u32>,
    comparator: C,
    disposer: D,
    policy: AllocPolicy,
}

impl<T: Ord> OrderedSet<T> {
    pub fn new() -> Self {
        OrderedSet::with_capabilities(NaturalOrder, DropElement)
    }
}

impl<T: Ord> Default for OrderedSet<T> {
    fn default() -> Self {
        OrderedSet::new()
    }
}

impl<T, C: Comparator<T>> OrderedSet<T, C> {
    pub fn with_comparator(comparator: C) -> Self {
        OrderedSet::with_capabilities(comparator, DropElement)
    }
}

impl<T, C, D: Disposer<T>> OrderedSet<T, C, D> {
    pub fn with_capabilities(comparator: C, disposer: D) -> Self {
        OrderedSet {
            slots: Vec::new(),
            vacant: Vec::new(),
            root: None,
            path: Vec::new(),
            comparator,
            disposer,
            policy: AllocPolicy::default(),
        }
    }

    /// Replaces the allocation policy used when the node arena grows.
    pub fn with_policy(mut self, policy: AllocPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn len(&self) -> usize {
        self.size(self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the tree; an empty tree has height 0.
    pub fn height(&self) -> usize {
        self.height_of(self.root) as usize
    }

    pub fn get(&self, node: NodeRef) -> Option<&T> {
        self.resolve(node).map(|index| &self.node(index).element)
    }

    /// Returns the `n`-th smallest element (0-based).
    pub fn select(&self, mut n: usize) -> Option<&T> {
        let mut cursor = self.root;
        while let Some(index) = cursor {
            let node = self.node(index);
            let left = self.size(node.left);
            match n.cmp(&left) {
                Ordering::Less => cursor = node.left,
                Ordering::Equal => return Some(&node.element),
                Ordering::Greater => {
                    n -= left + 1;
                    cursor = node.right;
                }
            }
        }
        None
    }

    /// In-order iterator over the elements.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.slots, self.root, self.len())
    }

    /// Releases every node in post-order, disposing of each element.
    pub fn clear(&mut self) {
        let root = self.root.take();
        self.release_subtree(root);
    }

    /// Indented dump of the tree structure, one `(element height size)` line
    /// per node in pre-order, prefixed by one `-` per level of depth.
    pub fn render_tree(&self) -> String
    where
        T: Debug,
    {
        let mut out = String::new();
        self.render_subtree(&mut out, self.root, 0);
        out
    }

    fn render_subtree(&self, out: &mut String, link: Link, depth: usize)
    where
        T: Debug,
    {
        let Some(index) = link else { return };
        let node = self.node(index);
        let _ = writeln!(
            out,
            "{}({:?} {} {})",
            "-".repeat(depth),
            node.element,
            node.height,
            node.size
        );
        self.render_subtree(out, node.left, depth + 1);
        self.render_subtree(out, node.right, depth + 1);
    }

    fn release_subtree(&mut self, link: Link) {
        let Some(index) = link else { return };
        let (left, right) = self.children(index);
        self.release_subtree(left);
        self.release_subtree(right);
        let element = self.release(index);
        self.disposer.dispose(element);
    }

    fn resolve(&self, node: NodeRef) -> Option<u32> {
        let slot = self.slots.get(node.index as usize)?;
        (slot.generation == node.generation && slot.node.is_some()).then_some(node.index)
    }

    fn handle(&self, index: u32) -> NodeRef {
        NodeRef {
            index,
            generation: self.slots[index as usize].generation,
        }
    }

    fn node(&self, index: u32) -> &Node<T> {
        occupied(&self.slots, index)
    }

    fn node_mut(&mut self, index: u32) -> &mut Node<T> {
        match &mut self.slots[index as usize].node {
            Some(node) => node,
            None => unreachable!("vacant slot {index} is linked into the tree"),
        }
    }

    fn children(&self, index: u32) -> (Link, Link) {
        let node = self.node(index);
        (node.left, node.right)
    }

    fn height_of(&self, link: Link) -> u32 {
        link.map_or(0, |index| self.node(index).height)
    }

    fn size(&self, link: Link) -> usize {
        link.map_or(0, |index| self.node(index).size as usize)
    }

    /// Places a new leaf in the arena. Room for it must already be reserved.
    fn allocate(&mut self, element: T) -> u32 {
        let node = Node {
            left: None,
            right: None,
            height: 1,
            size: 1,
            element,
        };
        match self.vacant.pop() {
            Some(index) => {
                self.slots[index as usize].node = Some(node);
                index
            }
            None => {
                assert!(
                    self.slots.len() < u32::MAX as usize,
                    "ordered set cannot address more than u32::MAX nodes"
                );
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                index
            }
        }
    }

    /// Vacates a slot and hands back its element. Outstanding handles to the
    /// slot become stale.
    fn release(&mut self, index: u32) -> T {
        let slot = &mut self.slots[index as usize];
        let Some(node) = slot.node.take() else {
            unreachable!("slot {index} released twice")
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.vacant.push(index);
        node.element
    }

    fn refresh(&mut self, index: u32) {
        let (left, right) = self.children(index);
        let height = 1 + self.height_of(left).max(self.height_of(right));
        let size = 1 + self.size(left) + self.size(right);
        let node = self.node_mut(index);
        node.height = height;
        node.size = size as u32;
    }

    fn rotate_left(&mut self, index: u32) -> u32 {
        let Some(pivot) = self.node(index).right else {
            return index;
        };
        let inner = self.node(pivot).left;
        self.node_mut(index).right = inner;
        self.node_mut(pivot).left = Some(index);
        self.refresh(index);
        self.refresh(pivot);
        pivot
    }

    fn rotate_right(&mut self, index: u32) -> u32 {
        let Some(pivot) = self.node(index).left else {
            return index;
        };
        let inner = self.node(pivot).right;
        self.node_mut(index).left = inner;
        self.node_mut(pivot).right = Some(index);
        self.refresh(index);
        self.refresh(pivot);
        pivot
    }

    /// Restores the AVL condition at `index` and returns the subtree's new top.
    ///
    /// The heavier child's own skew picks single vs. double rotation.
    fn rebalance(&mut self, index: u32) -> u32 {
        let (left, right) = self.children(index);
        let (lh, rh) = (self.height_of(left), self.height_of(right));
        match (left, right) {
            (Some(left), _) if lh > rh + 1 => {
                let (inner, outer) = {
                    let node = self.node(left);
                    (node.right, node.left)
                };
                if self.height_of(inner) > self.height_of(outer) {
                    let pivot = self.rotate_left(left);
                    self.node_mut(index).left = Some(pivot);
                }
                self.rotate_right(index)
            }
            (_, Some(right)) if rh > lh + 1 => {
                let (inner, outer) = {
                    let node = self.node(right);
                    (node.left, node.right)
                };
                if self.height_of(inner) > self.height_of(outer) {
                    let pivot = self.rotate_right(right);
                    self.node_mut(index).right = Some(pivot);
                }
                self.rotate_left(index)
            }
            _ => {
                self.refresh(index);
                index
            }
        }
    }

    /// Walks a root-to-node path bottom-up, rebalancing each ancestor and
    /// relinking rotated subtrees into their parent (or the root).
    fn rebalance_path(&mut self, path: &[u32]) {
        for (depth, &index) in path.iter().enumerate().rev() {
            let top = self.rebalance(index);
            if top != index {
                let parent = depth.checked_sub(1).map(|above| path[above]);
                self.relink(parent, index, Some(top));
            }
        }
    }

    fn relink(&mut self, parent: Link, old: u32, new: Link) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let node = self.node_mut(parent);
                if node.left == Some(old) {
                    node.left = new;
                } else {
                    node.right = new;
                }
            }
        }
    }
}

impl<T, C: Comparator<T>, D: Disposer<T>> OrderedSet<T, C, D> {
    /// Inserts `element`, returning `false` (and dropping it) when a
    /// comparator-equal element is already stored.
    pub fn insert(&mut self, element: T) -> Result<bool, AllocError> {
        if self.vacant.is_empty() {
            self.policy.reserve(&mut self.slots, 1)?;
            // release() must never reallocate the vacancy list
            let wanted = self.slots.len() + 1;
            self.policy.reserve(&mut self.vacant, wanted)?;
        }

        let Some(root) = self.root else {
            self.root = Some(self.allocate(element));
            return Ok(true);
        };

        let mut path = mem::take(&mut self.path);
        path.clear();
        // a root-to-leaf path holds at most height + 1 nodes
        if let Err(err) = self
            .policy
            .reserve(&mut path, self.node(root).height as usize + 1)
        {
            self.path = path;
            return Err(err);
        }

        let mut cursor = Some(root);
        let mut goes_left = false;
        while let Some(index) = cursor {
            let node = self.node(index);
            goes_left = match self.comparator.compare(&node.element, &element) {
                Ordering::Equal => {
                    self.path = path;
                    return Ok(false);
                }
                Ordering::Greater => true,
                Ordering::Less => false,
            };
            path.push(index);
            cursor = if goes_left { node.left } else { node.right };
        }

        let parent = path[path.len() - 1];
        let leaf = self.allocate(element);
        let parent = self.node_mut(parent);
        if goes_left {
            parent.left = Some(leaf);
        } else {
            parent.right = Some(leaf);
        }

        self.rebalance_path(&path);
        self.path = path;
        Ok(true)
    }

    /// Finds the node holding an element comparator-equal to `probe`.
    pub fn search(&self, probe: &T) -> Option<NodeRef> {
        let mut cursor = self.root;
        while let Some(index) = cursor {
            let node = self.node(index);
            match self.comparator.compare(&node.element, probe) {
                Ordering::Equal => return Some(self.handle(index)),
                Ordering::Less => cursor = node.right,
                Ordering::Greater => cursor = node.left,
            }
        }
        None
    }

    pub fn find(&self, probe: &T) -> Option<&T> {
        self.search(probe).and_then(|node| self.get(node))
    }

    pub fn contains(&self, probe: &T) -> bool {
        self.search(probe).is_some()
    }

    /// Number of stored elements sorting strictly before `probe`, if `probe`
    /// itself is stored.
    pub fn rank(&self, probe: &T) -> Option<usize> {
        let mut cursor = self.root;
        let mut before = 0;
        while let Some(index) = cursor {
            let node = self.node(index);
            match self.comparator.compare(&node.element, probe) {
                Ordering::Equal => return Some(before + self.size(node.left)),
                Ordering::Less => {
                    before += self.size(node.left) + 1;
                    cursor = node.right;
                }
                Ordering::Greater => cursor = node.left,
            }
        }
        None
    }

    /// Deletes the node behind `node`, disposing of its element.
    ///
    /// The path to the node is re-derived with the comparator, so the node
    /// must be reachable by a comparator-guided descent. A stale handle or an
    /// unreachable node leaves the tree unchanged and returns `false`, and so
    /// does a policy that refuses room for the ancestor path.
    pub fn delete_node(&mut self, node: NodeRef) -> bool {
        let Some(target) = self.resolve(node) else {
            return false;
        };
        let Some(root) = self.root else {
            return false;
        };

        let mut path = mem::take(&mut self.path);
        path.clear();
        // target and predecessor chain together stay within `height` nodes
        if let Err(err) = self
            .policy
            .reserve(&mut path, self.node(root).height as usize)
        {
            tracing::warn!(%err, "no room for the deletion path");
            self.path = path;
            return false;
        }

        let mut cursor = self.root;
        loop {
            let Some(index) = cursor else {
                self.path = path;
                return false;
            };
            path.push(index);
            if index == target {
                break;
            }
            let current = self.node(index);
            cursor = match self
                .comparator
                .compare(&current.element, &self.node(target).element)
            {
                Ordering::Less => current.right,
                Ordering::Equal | Ordering::Greater => current.left,
            };
        }

        let position = path.len() - 1;
        let parent = position.checked_sub(1).map(|above| path[above]);
        match self.children(target) {
            (Some(left), Some(_)) => {
                // splice in the in-order predecessor
                path.push(left);
                let mut predecessor = left;
                while let Some(next) = self.node(predecessor).right {
                    path.push(next);
                    predecessor = next;
                }
                let predecessor_parent = path[path.len() - 2];
                let orphan = self.node(predecessor).left;
                if predecessor_parent == target {
                    self.node_mut(target).left = orphan;
                } else {
                    self.node_mut(predecessor_parent).right = orphan;
                }

                let (left, right) = self.children(target);
                let moved = self.node_mut(predecessor);
                moved.left = left;
                moved.right = right;
                self.relink(parent, target, Some(predecessor));

                path[position] = predecessor;
                path.pop();
            }
            (only, None) | (None, only) => {
                self.relink(parent, target, only);
                path.pop();
            }
        }

        let element = self.release(target);
        self.rebalance_path(&path);
        self.path = path;
        self.disposer.dispose(element);
        true
    }

    /// Deletes every element comparator-equal to `probe`, returning how many
    /// were removed.
    pub fn delete_value(&mut self, probe: &T) -> usize {
        let mut removed = 0;
        while let Some(node) = self.search(probe) {
            if !self.delete_node(node) {
                break;
            }
            removed += 1;
        }
        removed
    }
}

impl<T, C, D: Disposer<T>> Drop for OrderedSet<T, C, D> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: Debug, C, D: Disposer<T>> Debug for OrderedSet<T, C, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, T, C, D: Disposer<T>> IntoIterator for &'a OrderedSet<T, C, D> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::BTreeSet, rc::Rc};

    use proptest::prelude::*;
    use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

    use super::*;

    impl<T, C: Comparator<T>, D: Disposer<T>> OrderedSet<T, C, D> {
        /// Verifies balance, cached heights/sizes and ordering of every node.
        fn check_consistency(&self) {
            self.check_subtree(self.root);
        }

        fn check_subtree(&self, link: Link) -> (u32, usize) {
            let Some(index) = link else { return (0, 0) };
            let node = self.node(index);
            let (lh, ls) = self.check_subtree(node.left);
            let (rh, rs) = self.check_subtree(node.right);
            assert!(lh.abs_diff(rh) <= 1, "unbalanced node at slot {index}");
            assert_eq!(node.height, lh.max(rh) + 1, "stale height at slot {index}");
            assert_eq!(node.size as usize, ls + rs + 1, "stale size at slot {index}");
            if let Some(left) = node.left {
                let order = self.comparator.compare(&self.node(left).element, &node.element);
                assert_eq!(order, Ordering::Less);
            }
            if let Some(right) = node.right {
                let order = self.comparator.compare(&self.node(right).element, &node.element);
                assert_eq!(order, Ordering::Greater);
            }
            (node.height, node.size as usize)
        }
    }

    fn collect<C: Comparator<i32>, D: Disposer<i32>>(set: &OrderedSet<i32, C, D>) -> Vec<i32> {
        set.iter().copied().collect()
    }

    fn recording_set() -> (
        OrderedSet<i32, NaturalOrder, impl FnMut(i32)>,
        Rc<RefCell<Vec<i32>>>,
    ) {
        let disposed = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&disposed);
        let set = OrderedSet::with_capabilities(NaturalOrder, move |x: i32| sink.borrow_mut().push(x));
        (set, disposed)
    }

    #[test]
    fn empty_set_has_height_zero() {
        let set: OrderedSet<i32> = OrderedSet::new();
        assert_eq!(set.height(), 0);
        assert_eq!(set.len(), 0);
        assert!(set.is_empty());
        assert_eq!(set.search(&3), None);
        assert_eq!(set.select(0), None);
    }

    #[test]
    fn ten_key_scenario_is_sorted_and_shallow() {
        let mut set = OrderedSet::new();
        for x in [5, 3, 8, 1, 4, 7, 9, 2, 6, 0] {
            assert!(set.insert(x).unwrap());
            set.check_consistency();
        }
        assert_eq!(collect(&set), (0..10).collect::<Vec<_>>());
        assert_eq!(set.len(), 10);
        let bound = (1.44 * 11f64.log2()).ceil() as usize;
        assert!(set.height() <= bound, "height {} above {}", set.height(), bound);
    }

    #[test]
    fn equal_elements_are_rejected() {
        let mut set = OrderedSet::new();
        assert!(set.insert(4).unwrap());
        assert!(!set.insert(4).unwrap());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn rejected_elements_are_not_disposed() {
        let (mut set, disposed) = recording_set();
        set.insert(1).unwrap();
        set.insert(1).unwrap();
        assert!(disposed.borrow().is_empty());
    }

    #[test]
    fn search_finds_inserted_and_misses_absent() {
        let mut set = OrderedSet::new();
        for x in (0..100).step_by(3) {
            set.insert(x).unwrap();
        }
        for x in 0..100 {
            let found = set.search(&x);
            assert_eq!(found.is_some(), x % 3 == 0);
            if let Some(node) = found {
                assert_eq!(set.get(node), Some(&x));
            }
        }
        assert_eq!(set.find(&9), Some(&9));
        assert!(!set.contains(&10));
    }

    #[test]
    fn ascending_inserts_stay_balanced() {
        let mut set = OrderedSet::new();
        for x in 0..1000 {
            set.insert(x).unwrap();
        }
        set.check_consistency();
        assert_eq!(set.len(), 1000);
        // AVL bound: 1.44 * log2(n + 2)
        assert!(set.height() <= 15);
    }

    #[test]
    fn delete_value_restores_previous_sequence() {
        let mut set = OrderedSet::new();
        for x in [20, 10, 30, 5, 15, 25, 35] {
            set.insert(x).unwrap();
        }
        let before = collect(&set);
        set.insert(12).unwrap();
        assert_eq!(set.delete_value(&12), 1);
        set.check_consistency();
        assert_eq!(collect(&set), before);
    }

    #[test]
    fn delete_value_of_absent_element_is_noop() {
        let mut set = OrderedSet::new();
        for x in 0..8 {
            set.insert(x).unwrap();
        }
        assert_eq!(set.delete_value(&42), 0);
        assert_eq!(collect(&set), (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn delete_covers_leaf_single_child_and_two_children() {
        let mut set = OrderedSet::new();
        for x in [50, 30, 70, 20, 40, 60, 80, 35, 45, 65] {
            set.insert(x).unwrap();
        }
        // one child
        assert_eq!(set.delete_value(&60), 1);
        set.check_consistency();
        // leaf
        assert_eq!(set.delete_value(&80), 1);
        set.check_consistency();
        // two children, predecessor is the left child itself
        assert_eq!(set.delete_value(&40), 1);
        set.check_consistency();
        // root, predecessor sits deeper in the left subtree
        assert_eq!(set.delete_value(&50), 1);
        set.check_consistency();
        assert_eq!(collect(&set), vec![20, 30, 35, 45, 65, 70]);
    }

    #[test]
    fn delete_root_until_empty() {
        let mut set = OrderedSet::new();
        for x in 0..33 {
            set.insert(x).unwrap();
        }
        while let Some(&middle) = set.select(set.len() / 2) {
            let node = set.search(&middle).unwrap();
            assert!(set.delete_node(node));
            set.check_consistency();
        }
        assert!(set.is_empty());
        assert_eq!(set.height(), 0);
    }

    #[test]
    fn delete_reserves_its_path_through_the_policy() {
        // a lone root is inserted without ever touching the path buffer
        let mut set = OrderedSet::new().with_policy(AllocPolicy::fail_fast());
        set.insert(7).unwrap();
        assert_eq!(set.path.capacity(), 0);
        let node = set.search(&7).unwrap();
        assert!(set.delete_node(node));
        assert!(set.path.capacity() >= 1);
        assert!(set.is_empty());

        set.clear();
        for x in 0..64 {
            set.insert(x).unwrap();
        }
        let height = set.height();
        let node = set.search(&31).unwrap();
        assert!(set.delete_node(node));
        assert!(set.path.capacity() >= height);
        set.check_consistency();
    }

    #[test]
    fn stale_handles_are_ignored() {
        let mut set = OrderedSet::new();
        for x in 0..5 {
            set.insert(x).unwrap();
        }
        let node = set.search(&2).unwrap();
        assert!(set.delete_node(node));
        assert!(!set.delete_node(node));
        assert_eq!(set.get(node), None);

        // the vacated slot is reused without reviving the old handle
        set.insert(10).unwrap();
        assert_eq!(set.get(node), None);
        assert!(!set.delete_node(node));
        assert_eq!(collect(&set), vec![0, 1, 3, 4, 10]);
    }

    #[test]
    fn disposer_runs_once_per_deleted_element() {
        let (mut set, disposed) = recording_set();
        for x in 0..6 {
            set.insert(x).unwrap();
        }
        set.delete_value(&3);
        set.delete_value(&0);
        assert_eq!(*disposed.borrow(), vec![3, 0]);
    }

    #[test]
    fn clear_disposes_in_post_order() {
        let (mut set, disposed) = recording_set();
        for x in [2, 1, 3] {
            set.insert(x).unwrap();
        }
        set.clear();
        assert_eq!(*disposed.borrow(), vec![1, 3, 2]);
        assert!(set.is_empty());
    }

    #[test]
    fn drop_disposes_remaining_elements() {
        let (mut set, disposed) = recording_set();
        for x in 0..10 {
            set.insert(x).unwrap();
        }
        set.delete_value(&4);
        drop(set);
        let mut seen = disposed.borrow().clone();
        seen.sort();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn custom_comparator_defines_order() {
        let mut set = OrderedSet::with_comparator(|a: &i32, b: &i32| b.cmp(a));
        for x in [3, 9, 1, 7] {
            set.insert(x).unwrap();
        }
        assert_eq!(collect(&set), vec![9, 7, 3, 1]);
        assert!(set.contains(&7));
    }

    #[test]
    fn rank_and_select_agree() {
        let mut set = OrderedSet::new();
        let mut values: Vec<i32> = (0..200).map(|x| x * 7 % 211).collect();
        values.shuffle(&mut StdRng::seed_from_u64(7));
        for &x in &values {
            set.insert(x).unwrap();
        }
        let sorted = collect(&set);
        for (position, x) in sorted.iter().enumerate() {
            assert_eq!(set.rank(x), Some(position));
            assert_eq!(set.select(position), Some(x));
        }
        assert_eq!(set.rank(&1000), None);
        assert_eq!(set.select(sorted.len()), None);
    }

    #[test]
    fn iterator_reports_exact_length() {
        let mut set = OrderedSet::new();
        for x in 0..17 {
            set.insert(x).unwrap();
        }
        let mut iter = set.iter();
        assert_eq!(iter.len(), 17);
        iter.next();
        assert_eq!(iter.len(), 16);
    }

    #[test]
    fn render_tree_shows_structure() {
        let mut set = OrderedSet::new();
        for x in [2, 1, 3] {
            set.insert(x).unwrap();
        }
        assert_eq!(set.render_tree(), "(2 2 3)\n-(1 1 1)\n-(3 1 1)\n");
    }

    #[test]
    fn debug_lists_elements_in_order() {
        let mut set = OrderedSet::new();
        for x in [2, 1, 3] {
            set.insert(x).unwrap();
        }
        assert_eq!(format!("{set:?}"), "{1, 2, 3}");
    }

    #[derive(Debug, Clone)]
    enum Op {
        Insert(i16),
        Delete(i16),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => any::<i16>().prop_map(|x| Op::Insert(x % 64)),
            2 => any::<i16>().prop_map(|x| Op::Delete(x % 64)),
        ]
    }

    proptest! {
        #[test]
        fn matches_btreeset_model(ops in prop::collection::vec(op_strategy(), 0..300)) {
            let mut set = OrderedSet::new();
            let mut model = BTreeSet::new();
            for op in ops {
                match op {
                    Op::Insert(x) => {
                        prop_assert_eq!(set.insert(x).unwrap(), model.insert(x));
                    }
                    Op::Delete(x) => {
                        let expected = usize::from(model.remove(&x));
                        prop_assert_eq!(set.delete_value(&x), expected);
                    }
                }
                set.check_consistency();
            }
            prop_assert_eq!(set.len(), model.len());
            prop_assert!(set.iter().eq(model.iter()));
        }

        #[test]
        fn inserted_element_is_found(values in prop::collection::vec(any::<i32>(), 0..200), probe in any::<i32>()) {
            let mut set = OrderedSet::new();
            for x in values {
                set.insert(x).unwrap();
            }
            set.insert(probe).unwrap();
            prop_assert_eq!(set.find(&probe), Some(&probe));
        }
    }
}
