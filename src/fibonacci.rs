//! Fibonacci-style priority forest
//!
//! A [`PriorityForest`] is a min-heap with:
//! - O(1) insert and find_min
//! - O(1) amortized decrease_key
//! - O(log n) amortized delete_min
//!
//! The structure is a collection of heap-ordered multi-way trees. Roots are
//! linked in a circular doubly linked list (the root ring), every node's
//! children form a ring of their own, and the forest keeps a pointer to the
//! minimum root.
//!
//! # Storage
//!
//! Nodes live in a [`SlotMap`] arena. Parent, child and sibling links are
//! arena keys rather than pointers, so the cyclic structure needs no `unsafe`
//! and no reference counting. Keys are generational: once a node is extracted
//! its key never resolves again, which is how stale handles are detected.
//!
//! # Marking
//!
//! A non-root node is marked when it loses its first child. Losing a second
//! child cuts it from its own parent, and the walk continues upward (the
//! cascading cut). This bounds the size of a subtree by its degree and keeps
//! decrease_key O(1) amortized.

use crate::rank::{checked_increment, saturating_decrement, slot_count, Rank};
use crate::traits::{DecreaseKeyHeap, Handle, Heap, HeapError};
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use thiserror::Error;

new_key_type! {
    struct NodeKey;
}

/// Handle to an element in a [`PriorityForest`]
///
/// A handle stays valid until its element is extracted by `delete_min`.
/// Using it afterwards yields [`HeapError::InvalidHandle`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ForestHandle(NodeKey);

impl Handle for ForestHandle {}

#[derive(Debug)]
struct Node<T, P> {
    item: T,
    priority: P,
    parent: Option<NodeKey>,
    child: Option<NodeKey>,
    left: NodeKey,
    right: NodeKey,
    degree: Rank,
    marked: bool,
}

/// Structural defect reported by [`PriorityForest::validate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("sibling links are not a closed doubly linked ring")]
    BrokenRing,
    #[error("a child has a smaller priority than its parent")]
    HeapOrder,
    #[error("node degree {recorded} does not match its {actual} children")]
    DegreeMismatch { recorded: usize, actual: usize },
    #[error("node parent link does not match the ring it lives in")]
    ParentMismatch,
    #[error("a root is marked")]
    MarkedRoot,
    #[error("the minimum pointer does not reference the smallest root")]
    StaleMinimum,
    #[error("{reachable} nodes reachable from the root ring, {stored} stored")]
    CountMismatch { reachable: usize, stored: usize },
}

/// Fibonacci-style priority forest
///
/// # Example
///
/// ```rust
/// use fib_sssp::fibonacci::PriorityForest;
///
/// let mut forest = PriorityForest::new();
/// let handle = forest.insert(5, "item");
/// forest.insert(3, "other");
/// forest.decrease_key(&handle, 1).unwrap();
/// assert_eq!(forest.find_min(), Some((&1, &"item")));
/// assert_eq!(forest.delete_min(), Some((1, "item")));
/// ```
#[derive(Debug)]
pub struct PriorityForest<T, P: Ord> {
    nodes: SlotMap<NodeKey, Node<T, P>>,
    /// Minimum root; doubles as the entry point of the root ring.
    min: Option<NodeKey>,
}

impl<T, P: Ord> Default for PriorityForest<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P: Ord> PriorityForest<T, P> {
    /// Creates an empty forest
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            min: None,
        }
    }

    /// Creates an empty forest with room for `capacity` nodes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: SlotMap::with_capacity_and_key(capacity),
            min: None,
        }
    }

    /// Number of live elements
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none()
    }

    /// Returns true while the handle's element has not been extracted
    pub fn contains(&self, handle: &ForestHandle) -> bool {
        self.nodes.contains_key(handle.0)
    }

    /// Current priority of the handle's element, if it is still live
    pub fn priority(&self, handle: &ForestHandle) -> Option<&P> {
        self.nodes.get(handle.0).map(|node| &node.priority)
    }

    /// Inserts a new element as a singleton tree in the root ring
    ///
    /// **Time Complexity**: O(1)
    pub fn insert(&mut self, priority: P, item: T) -> ForestHandle {
        let key = self.nodes.insert_with_key(|key| Node {
            item,
            priority,
            parent: None,
            child: None,
            left: key,
            right: key,
            degree: 0,
            marked: false,
        });
        self.add_root(key);
        ForestHandle(key)
    }

    /// Returns the minimum element without removing it
    ///
    /// **Time Complexity**: O(1)
    pub fn find_min(&self) -> Option<(&P, &T)> {
        self.min.map(|key| {
            let node = &self.nodes[key];
            (&node.priority, &node.item)
        })
    }

    /// Removes and returns the minimum element
    ///
    /// **Time Complexity**: O(log n) amortized
    ///
    /// **Algorithm**:
    /// 1. Splice the minimum's child ring into the root ring
    /// 2. Unlink the minimum from the root ring and free its slot
    /// 3. Consolidate the remaining roots so that no two share a degree
    /// 4. Pick the smallest surviving root as the new minimum
    pub fn delete_min(&mut self) -> Option<(P, T)> {
        let min = self.min?;

        if let Some(child) = self.nodes[min].child.take() {
            for key in self.ring_members(child) {
                let node = &mut self.nodes[key];
                node.parent = None;
                node.marked = false;
            }
            self.concat_rings(min, child);
        }

        let next = self.nodes[min].right;
        self.unlink_from_ring(min);
        let removed = self.nodes.remove(min)?;

        if next == min {
            self.min = None;
        } else {
            self.consolidate(next);
        }

        Some((removed.priority, removed.item))
    }

    /// Lowers the priority of the handle's element
    ///
    /// **Time Complexity**: O(1) amortized
    ///
    /// If the element now beats its parent it is cut into the root ring, and
    /// the former parent is marked, or cut as well if it was already marked.
    ///
    /// # Errors
    /// - [`HeapError::InvalidHandle`] if the element was already extracted
    /// - [`HeapError::OrderingViolation`] if `new_priority` is not strictly
    ///   smaller than the current priority
    pub fn decrease_key(&mut self, handle: &ForestHandle, new_priority: P) -> Result<(), HeapError> {
        let key = handle.0;
        let node = self.nodes.get_mut(key).ok_or(HeapError::InvalidHandle)?;
        if new_priority >= node.priority {
            return Err(HeapError::OrderingViolation);
        }
        node.priority = new_priority;

        if let Some(parent) = node.parent {
            if self.nodes[key].priority < self.nodes[parent].priority {
                self.cut(key, parent);
                self.cascading_cut(parent);
            }
        }

        if let Some(min) = self.min {
            if self.nodes[key].priority < self.nodes[min].priority {
                self.min = Some(key);
            }
        }
        Ok(())
    }

    /// Checks every structural invariant of the forest
    ///
    /// Walks every ring, so this costs O(n). Intended for tests.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let Some(min) = self.min else {
            return match self.nodes.len() {
                0 => Ok(()),
                stored => Err(InvariantViolation::CountMismatch { reachable: 0, stored }),
            };
        };

        let roots = self.checked_ring(min)?;
        let mut reachable = 0;
        let mut pending: Vec<NodeKey> = Vec::new();
        for &root in &roots {
            let node = &self.nodes[root];
            if node.parent.is_some() {
                return Err(InvariantViolation::ParentMismatch);
            }
            if node.marked {
                return Err(InvariantViolation::MarkedRoot);
            }
            if node.priority < self.nodes[min].priority {
                return Err(InvariantViolation::StaleMinimum);
            }
            pending.push(root);
        }

        while let Some(key) = pending.pop() {
            reachable += 1;
            let node = &self.nodes[key];
            let children = match node.child {
                Some(first) => self.checked_ring(first)?,
                None => SmallVec::new(),
            };
            if children.len() != node.degree as usize {
                return Err(InvariantViolation::DegreeMismatch {
                    recorded: node.degree as usize,
                    actual: children.len(),
                });
            }
            for &child in &children {
                let child_node = &self.nodes[child];
                if child_node.parent != Some(key) {
                    return Err(InvariantViolation::ParentMismatch);
                }
                if child_node.priority < node.priority {
                    return Err(InvariantViolation::HeapOrder);
                }
                pending.push(child);
            }
            if reachable > self.nodes.len() {
                break;
            }
        }

        if reachable != self.nodes.len() {
            return Err(InvariantViolation::CountMismatch {
                reachable,
                stored: self.nodes.len(),
            });
        }
        Ok(())
    }

    /// Adds a singleton node to the root ring, updating the minimum
    fn add_root(&mut self, key: NodeKey) {
        match self.min {
            Some(min) => {
                self.splice_into_ring(min, key);
                if self.nodes[key].priority < self.nodes[min].priority {
                    self.min = Some(key);
                }
            }
            None => self.min = Some(key),
        }
    }

    /// Inserts singleton `key` to the left of `anchor` in anchor's ring
    fn splice_into_ring(&mut self, anchor: NodeKey, key: NodeKey) {
        let anchor_left = self.nodes[anchor].left;
        {
            let node = &mut self.nodes[key];
            node.left = anchor_left;
            node.right = anchor;
        }
        self.nodes[anchor_left].right = key;
        self.nodes[anchor].left = key;
    }

    /// Joins the ring containing `b` into the ring containing `a`
    fn concat_rings(&mut self, a: NodeKey, b: NodeKey) {
        let a_left = self.nodes[a].left;
        let b_left = self.nodes[b].left;
        self.nodes[a_left].right = b;
        self.nodes[b].left = a_left;
        self.nodes[b_left].right = a;
        self.nodes[a].left = b_left;
    }

    /// Removes `key` from its ring, leaving it as a singleton
    fn unlink_from_ring(&mut self, key: NodeKey) {
        let (left, right) = {
            let node = &self.nodes[key];
            (node.left, node.right)
        };
        self.nodes[left].right = right;
        self.nodes[right].left = left;
        let node = &mut self.nodes[key];
        node.left = key;
        node.right = key;
    }

    /// Snapshot of a ring's members, walking rightwards from `start`
    fn ring_members(&self, start: NodeKey) -> SmallVec<[NodeKey; 16]> {
        let mut members = SmallVec::new();
        let mut current = start;
        loop {
            members.push(current);
            current = self.nodes[current].right;
            if current == start {
                break;
            }
        }
        members
    }

    /// Like [`Self::ring_members`], but verifies the links and never loops
    fn checked_ring(&self, start: NodeKey) -> Result<SmallVec<[NodeKey; 16]>, InvariantViolation> {
        let mut members = SmallVec::new();
        let mut current = start;
        loop {
            let node = self.nodes.get(current).ok_or(InvariantViolation::BrokenRing)?;
            let right = self.nodes.get(node.right).ok_or(InvariantViolation::BrokenRing)?;
            if right.left != current || members.len() > self.nodes.len() {
                return Err(InvariantViolation::BrokenRing);
            }
            members.push(current);
            current = node.right;
            if current == start {
                return Ok(members);
            }
        }
    }

    /// Links trees of equal degree until every root degree is distinct
    ///
    /// Rebuilds the root ring from the degree slots and picks the new minimum.
    fn consolidate(&mut self, start: NodeKey) {
        let mut slots: Vec<Option<NodeKey>> = vec![None; slot_count(self.nodes.len())];

        for root in self.ring_members(start) {
            let mut x = root;
            let mut degree = self.nodes[x].degree as usize;
            loop {
                if degree >= slots.len() {
                    slots.resize(degree + 1, None);
                }
                match slots[degree].take() {
                    Some(mut y) => {
                        if self.nodes[y].priority < self.nodes[x].priority {
                            std::mem::swap(&mut x, &mut y);
                        }
                        self.link(y, x);
                        degree += 1;
                    }
                    None => {
                        slots[degree] = Some(x);
                        break;
                    }
                }
            }
        }

        self.min = None;
        for root in slots.into_iter().flatten() {
            let node = &mut self.nodes[root];
            node.left = root;
            node.right = root;
            self.add_root(root);
        }
    }

    /// Makes root `child` a child of root `parent`
    ///
    /// Only called during consolidation: the root ring is rebuilt afterwards,
    /// so `child`'s old root-ring neighbours are not patched here.
    fn link(&mut self, child: NodeKey, parent: NodeKey) {
        {
            let node = &mut self.nodes[child];
            node.parent = Some(parent);
            node.marked = false;
            node.left = child;
            node.right = child;
        }
        match self.nodes[parent].child {
            Some(first) => self.splice_into_ring(first, child),
            None => self.nodes[parent].child = Some(child),
        }
        let parent_node = &mut self.nodes[parent];
        parent_node.degree = checked_increment(parent_node.degree);
    }

    /// Detaches `key` from `parent` and moves it to the root ring, unmarked
    fn cut(&mut self, key: NodeKey, parent: NodeKey) {
        let right = self.nodes[key].right;
        {
            let parent_node = &mut self.nodes[parent];
            if parent_node.child == Some(key) {
                parent_node.child = if right == key { None } else { Some(right) };
            }
            parent_node.degree = saturating_decrement(parent_node.degree);
        }
        self.unlink_from_ring(key);
        {
            let node = &mut self.nodes[key];
            node.parent = None;
            node.marked = false;
        }
        self.add_root(key);
    }

    /// Walks up from a node that just lost a child
    ///
    /// Roots stop the walk. An unmarked node is marked and stops the walk.
    /// A marked node is cut and the walk continues at its former parent.
    fn cascading_cut(&mut self, mut key: NodeKey) {
        while let Some(parent) = self.nodes[key].parent {
            if !self.nodes[key].marked {
                self.nodes[key].marked = true;
                return;
            }
            self.cut(key, parent);
            key = parent;
        }
    }
}

impl<T, P: Ord> Heap<T, P> for PriorityForest<T, P> {
    fn new() -> Self {
        PriorityForest::new()
    }

    fn with_capacity(capacity: usize) -> Self {
        PriorityForest::with_capacity(capacity)
    }

    fn is_empty(&self) -> bool {
        PriorityForest::is_empty(self)
    }

    fn len(&self) -> usize {
        PriorityForest::len(self)
    }

    fn push(&mut self, priority: P, item: T) {
        self.insert(priority, item);
    }

    fn peek(&self) -> Option<(&P, &T)> {
        self.find_min()
    }

    fn pop(&mut self) -> Option<(P, T)> {
        self.delete_min()
    }
}

impl<T, P: Ord> DecreaseKeyHeap<T, P> for PriorityForest<T, P> {
    type Handle = ForestHandle;

    fn push_with_handle(&mut self, priority: P, item: T) -> Self::Handle {
        self.insert(priority, item)
    }

    fn decrease_key(&mut self, handle: &Self::Handle, new_priority: P) -> Result<(), HeapError> {
        PriorityForest::decrease_key(self, handle, new_priority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_count<T, P: Ord>(forest: &PriorityForest<T, P>) -> usize {
        forest.min.map_or(0, |min| forest.ring_members(min).len())
    }

    fn is_marked<T, P: Ord>(forest: &PriorityForest<T, P>, handle: &ForestHandle) -> bool {
        forest.nodes[handle.0].marked
    }

    #[test]
    fn test_basic_operations() {
        let mut forest = PriorityForest::new();
        assert!(forest.is_empty());
        assert_eq!(forest.len(), 0);
        assert_eq!(forest.find_min(), None);
        assert_eq!(forest.delete_min(), None);

        forest.insert(5, "a");
        forest.insert(3, "b");
        forest.insert(7, "c");

        assert_eq!(forest.len(), 3);
        assert_eq!(forest.find_min(), Some((&3, &"b")));

        assert_eq!(forest.delete_min(), Some((3, "b")));
        assert_eq!(forest.find_min(), Some((&5, &"a")));
        assert_eq!(forest.len(), 2);
        forest.validate().unwrap();
    }

    #[test]
    fn test_decrease_key_reorders_extraction() {
        let mut forest = PriorityForest::new();
        forest.insert(5, 'a');
        forest.insert(3, 'b');
        let eight = forest.insert(8, 'c');
        forest.insert(1, 'd');

        forest.decrease_key(&eight, 0).unwrap();

        let popped: Vec<i32> = std::iter::from_fn(|| forest.delete_min().map(|(p, _)| p)).collect();
        assert_eq!(popped, vec![0, 1, 3, 5]);
    }

    #[test]
    fn test_decrease_key_rejects_non_decrease() {
        let mut forest = PriorityForest::new();
        let a = forest.insert(10, "a");
        forest.insert(20, "b");

        assert_eq!(forest.decrease_key(&a, 10), Err(HeapError::OrderingViolation));
        assert_eq!(forest.decrease_key(&a, 11), Err(HeapError::OrderingViolation));
        assert_eq!(forest.priority(&a), Some(&10));
        assert_eq!(forest.find_min(), Some((&10, &"a")));
        forest.validate().unwrap();
    }

    #[test]
    fn test_decrease_key_after_extraction_is_invalid() {
        let mut forest = PriorityForest::new();
        let a = forest.insert(1, "a");
        let b = forest.insert(2, "b");

        assert_eq!(forest.delete_min(), Some((1, "a")));
        assert!(!forest.contains(&a));
        assert!(forest.contains(&b));
        assert_eq!(forest.decrease_key(&a, 0), Err(HeapError::InvalidHandle));
        assert_eq!(forest.find_min(), Some((&2, &"b")));
        forest.validate().unwrap();
    }

    #[test]
    fn test_consolidation_links_equal_degrees() {
        let mut forest = PriorityForest::new();
        for key in 0..9 {
            forest.insert(key, key);
        }
        assert_eq!(root_count(&forest), 9);

        assert_eq!(forest.delete_min(), Some((0, 0)));
        // Eight singletons consolidate into one tree of degree three.
        assert_eq!(root_count(&forest), 1);
        let root = forest.min.unwrap();
        assert_eq!(forest.nodes[root].degree, 3);
        forest.validate().unwrap();
    }

    #[test]
    fn test_cascading_cut() {
        let mut forest = PriorityForest::new();
        let handles: Vec<ForestHandle> = (0..9).map(|i| forest.insert(i * 10, i)).collect();
        forest.delete_min();
        // Tree shape: 10(20, 30(40), 50(60, 70(80)))
        assert_eq!(root_count(&forest), 1);

        // 80 drops below its parent 70: cut, and 70 becomes marked.
        forest.decrease_key(&handles[8], 65).unwrap();
        assert!(is_marked(&forest, &handles[7]));
        assert_eq!(root_count(&forest), 2);
        forest.validate().unwrap();

        // 70 drops below 50: cut (clearing its mark), 50 becomes marked.
        forest.decrease_key(&handles[7], 45).unwrap();
        assert!(!is_marked(&forest, &handles[7]));
        assert!(is_marked(&forest, &handles[5]));
        assert_eq!(root_count(&forest), 3);
        forest.validate().unwrap();

        // 60 loses to 50 again: cut 60, and the marked 50 is cut with it.
        forest.decrease_key(&handles[6], 5).unwrap();
        assert!(!is_marked(&forest, &handles[5]));
        assert_eq!(root_count(&forest), 5);
        assert_eq!(forest.find_min(), Some((&5, &6)));
        forest.validate().unwrap();

        let popped: Vec<i32> = std::iter::from_fn(|| forest.delete_min().map(|(p, _)| p)).collect();
        assert_eq!(popped, vec![5, 10, 20, 30, 40, 45, 50, 65]);
    }

    #[test]
    fn test_decrease_key_within_heap_order_keeps_tree() {
        let mut forest = PriorityForest::new();
        let handles: Vec<ForestHandle> = (0..5).map(|i| forest.insert(i * 10, i)).collect();
        forest.delete_min();
        // 10(20, 30(40))
        forest.decrease_key(&handles[4], 35).unwrap();
        assert_eq!(root_count(&forest), 1);
        assert!(!is_marked(&forest, &handles[3]));
        forest.validate().unwrap();
    }

    #[test]
    fn test_equal_priorities() {
        let mut forest = PriorityForest::new();
        for item in 0..20 {
            forest.insert(7, item);
        }
        let mut seen = Vec::new();
        while let Some((priority, item)) = forest.delete_min() {
            assert_eq!(priority, 7);
            seen.push(item);
            forest.validate().unwrap();
        }
        seen.sort_unstable();
        assert_eq!(seen, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_validate_detects_heap_order_violation() {
        let mut forest = PriorityForest::new();
        for key in 0..3 {
            forest.insert(key, ());
        }
        forest.delete_min();
        // 1(2): corrupt the child priority behind the forest's back.
        let root = forest.min.unwrap();
        let child = forest.nodes[root].child.unwrap();
        forest.nodes[child].priority = 0;
        assert_eq!(forest.validate(), Err(InvariantViolation::HeapOrder));
    }
}
