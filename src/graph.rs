//! Dense adjacency-matrix graphs
//!
//! A [`DenseGraph`] stores an n×n weight matrix in row-major order. Missing
//! edges (and the diagonal) hold the [`INF`] sentinel, which is never treated
//! as a finite weight.

use rand::Rng;
use thiserror::Error;

/// Edge weight and path distance type
pub type Weight = u64;

/// Sentinel for "no edge" and "unreached"
pub const INF: Weight = Weight::MAX;

/// Errors raised while building a graph
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("row {row} has {len} entries, expected {expected}")]
    NotSquare { row: usize, len: usize, expected: usize },
    #[error("vertex {vertex} is out of range for a graph with {vertices} vertices")]
    VertexOutOfRange { vertex: usize, vertices: usize },
}

/// Dense directed graph over vertices `0..n`
///
/// # Example
///
/// ```rust
/// use fib_sssp::graph::{DenseGraph, INF};
///
/// let graph = DenseGraph::from_rows(vec![
///     vec![INF, 5, 9],
///     vec![INF, INF, 2],
///     vec![INF, INF, INF],
/// ])
/// .unwrap();
///
/// assert_eq!(graph.weight(0, 1), Some(5));
/// assert_eq!(graph.weight(1, 0), None);
/// assert_eq!(graph.neighbors(0).collect::<Vec<_>>(), vec![(1, 5), (2, 9)]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseGraph {
    n: usize,
    weights: Vec<Weight>,
}

impl DenseGraph {
    /// Creates a graph with `n` vertices and no edges
    pub fn new(n: usize) -> Self {
        DenseGraph {
            n,
            weights: vec![INF; n * n],
        }
    }

    /// Builds a graph from matrix rows; every row must have one entry per row
    pub fn from_rows(rows: Vec<Vec<Weight>>) -> Result<Self, GraphError> {
        let n = rows.len();
        let mut weights = Vec::with_capacity(n * n);
        for (row, entries) in rows.into_iter().enumerate() {
            if entries.len() != n {
                return Err(GraphError::NotSquare {
                    row,
                    len: entries.len(),
                    expected: n,
                });
            }
            weights.extend(entries);
        }
        Ok(DenseGraph { n, weights })
    }

    /// Builds a graph with `n` vertices from `(from, to, weight)` triples
    pub fn from_edges(n: usize, edges: &[(usize, usize, Weight)]) -> Result<Self, GraphError> {
        let mut graph = DenseGraph::new(n);
        for &(from, to, weight) in edges {
            graph.add_edge(from, to, weight)?;
        }
        Ok(graph)
    }

    /// Random complete symmetric graph
    ///
    /// Every off-diagonal pair gets a weight drawn uniformly from
    /// `1..=max_weight`, mirrored across the diagonal. The diagonal is [`INF`].
    pub fn random_symmetric<R: Rng + ?Sized>(n: usize, max_weight: Weight, rng: &mut R) -> Self {
        let mut graph = DenseGraph::new(n);
        let max_weight = max_weight.max(1);
        for i in 0..n {
            for j in (i + 1)..n {
                let weight = rng.gen_range(1..=max_weight);
                graph.weights[i * n + j] = weight;
                graph.weights[j * n + i] = weight;
            }
        }
        graph
    }

    pub fn num_vertices(&self) -> usize {
        self.n
    }

    /// Sets the weight of the directed edge `from -> to`
    ///
    /// Passing [`INF`] removes the edge.
    pub fn add_edge(&mut self, from: usize, to: usize, weight: Weight) -> Result<(), GraphError> {
        self.check_vertex(from)?;
        self.check_vertex(to)?;
        self.weights[from * self.n + to] = weight;
        Ok(())
    }

    /// Adds the edge in both directions
    pub fn add_undirected_edge(&mut self, a: usize, b: usize, weight: Weight) -> Result<(), GraphError> {
        self.add_edge(a, b, weight)?;
        self.add_edge(b, a, weight)
    }

    /// Weight of `from -> to`, or `None` when there is no edge
    ///
    /// # Panics
    /// Panics if either vertex is out of range.
    pub fn weight(&self, from: usize, to: usize) -> Option<Weight> {
        assert!(from < self.n && to < self.n, "vertex out of range");
        match self.weights[from * self.n + to] {
            INF => None,
            weight => Some(weight),
        }
    }

    /// Finite out-edges of `from` as `(to, weight)` pairs, in vertex order
    ///
    /// # Panics
    /// Panics if `from` is out of range.
    pub fn neighbors(&self, from: usize) -> impl Iterator<Item = (usize, Weight)> + '_ {
        self.row(from)
            .iter()
            .enumerate()
            .filter(|&(_, &weight)| weight != INF)
            .map(|(to, &weight)| (to, weight))
    }

    /// Raw matrix row of `from`, [`INF`] entries included
    ///
    /// # Panics
    /// Panics if `from` is out of range.
    pub fn row(&self, from: usize) -> &[Weight] {
        assert!(from < self.n, "vertex out of range");
        &self.weights[from * self.n..(from + 1) * self.n]
    }

    pub(crate) fn check_vertex(&self, vertex: usize) -> Result<(), GraphError> {
        if vertex < self.n {
            Ok(())
        } else {
            Err(GraphError::VertexOutOfRange {
                vertex,
                vertices: self.n,
            })
        }
    }
}
