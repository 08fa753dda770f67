//! Dense-graph shortest paths with a Fibonacci-style priority forest
//!
//! This crate computes single-source shortest paths over dense weighted
//! graphs with two interchangeable priority-selection strategies:
//!
//! - **Priority forest**: an arena-backed Fibonacci heap with O(1) amortized
//!   insert and decrease_key and O(log n) amortized delete-min
//! - **Flat scan**: a linear scan over unvisited vertices, O(V²) total
//!
//! # Example
//!
//! ```rust
//! use fib_sssp::graph::{DenseGraph, INF};
//! use fib_sssp::pathfinding::ShortestPathSolver;
//!
//! let mut graph = DenseGraph::new(4);
//! graph.add_edge(0, 1, 5).unwrap();
//! graph.add_edge(0, 2, 9).unwrap();
//! graph.add_edge(1, 2, 2).unwrap();
//!
//! let paths = ShortestPathSolver::new(&graph, 0).unwrap().solve().unwrap();
//! assert_eq!(paths.distances(), &[0, 5, 7, INF]);
//! ```
//!
//! The heap is usable on its own:
//!
//! ```rust
//! use fib_sssp::fibonacci::PriorityForest;
//!
//! let mut forest = PriorityForest::new();
//! let handle1 = forest.insert(5, "item1");
//! forest.insert(3, "item2");
//! forest.decrease_key(&handle1, 1).unwrap();
//! assert_eq!(forest.find_min(), Some((&1, &"item1")));
//! ```

pub mod fibonacci;
pub mod flat_scan;
pub mod graph;
pub mod pathfinding;
pub mod rank;
pub mod traits;

// Re-export the main traits for convenience
pub use traits::{DecreaseKeyHeap, Heap, HeapError};
