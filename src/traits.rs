//! Common traits for the priority queues driving the shortest-path solvers
//!
//! This module provides a two-tier trait hierarchy:
//!
//! - [`Heap`]: Base trait for min-heaps storing `(priority, item)` pairs
//! - [`DecreaseKeyHeap`]: Extended trait adding handle-based `decrease_key`
//!
//! The solver in [`crate::pathfinding`] is generic over [`DecreaseKeyHeap`], so
//! any heap that hands out stable handles can drive the relaxation loop.

use thiserror::Error;

/// Error type for heap operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HeapError {
    /// The new priority is not strictly less than the current priority
    #[error("new priority is not less than current priority")]
    OrderingViolation,
    /// The handle no longer addresses a live element (it was already extracted)
    #[error("handle is no longer valid (element was removed)")]
    InvalidHandle,
}

/// A handle to an element in the heap, used for decrease_key operations
///
/// Handles are cheap to copy and compare. A handle only has meaning for the
/// heap instance that issued it.
pub trait Handle: Copy + PartialEq + Eq + std::fmt::Debug {}

/// Base trait for min-heap data structures
///
/// The API mirrors `BinaryHeap`:
/// - `push` inserts an element
/// - `pop` removes and returns the minimum
/// - `peek` returns the minimum without removing it
///
/// Unlike `BinaryHeap`, which is a max-heap over `Ord` values, these heaps are
/// min-heaps over `(priority, item)` pairs.
///
/// # Example
///
/// ```rust
/// use fib_sssp::Heap;
/// use fib_sssp::fibonacci::PriorityForest;
///
/// let mut heap = PriorityForest::new();
/// heap.push(3, "three");
/// heap.push(1, "one");
/// heap.push(2, "two");
///
/// assert_eq!(heap.peek(), Some((&1, &"one")));
/// assert_eq!(heap.pop(), Some((1, "one")));
/// ```
pub trait Heap<T, P: Ord> {
    /// Creates a new empty heap
    fn new() -> Self;

    /// Creates an empty heap with room for `capacity` elements
    fn with_capacity(capacity: usize) -> Self
    where
        Self: Sized,
    {
        let _ = capacity;
        Self::new()
    }

    /// Returns true if the heap is empty
    fn is_empty(&self) -> bool;

    /// Returns the number of elements in the heap
    fn len(&self) -> usize;

    /// Inserts an element with the given priority
    fn push(&mut self, priority: P, item: T);

    /// Returns the minimum priority and associated item without removing it
    ///
    /// # Time Complexity
    /// O(1)
    fn peek(&self) -> Option<(&P, &T)>;

    /// Removes and returns the minimum priority and associated item
    ///
    /// Returns `None` on an empty heap; this is the termination signal for
    /// the solver rather than an error.
    fn pop(&mut self) -> Option<(P, T)>;
}

/// Extended heap trait with `decrease_key` support
///
/// # Example
///
/// ```rust
/// use fib_sssp::{DecreaseKeyHeap, Heap};
/// use fib_sssp::fibonacci::PriorityForest;
///
/// let mut heap = PriorityForest::new();
/// let handle = heap.push_with_handle(10, "item");
/// heap.decrease_key(&handle, 5).unwrap();
/// assert_eq!(heap.peek(), Some((&5, &"item")));
/// ```
pub trait DecreaseKeyHeap<T, P: Ord>: Heap<T, P> {
    /// The handle type for this heap, used to reference elements for decrease_key
    type Handle: Handle;

    /// Inserts an element with the given priority, returning a handle
    fn push_with_handle(&mut self, priority: P, item: T) -> Self::Handle;

    /// Decreases the priority of the element identified by the handle
    ///
    /// # Errors
    /// - [`HeapError::InvalidHandle`] if the element is no longer in the heap
    /// - [`HeapError::OrderingViolation`] if `new_priority` is not strictly less
    ///   than the current priority
    ///
    /// The heap is left unchanged when an error is returned.
    fn decrease_key(&mut self, handle: &Self::Handle, new_priority: P) -> Result<(), HeapError>;
}
