//! Single-source shortest paths over dense graphs
//!
//! This module drives Dijkstra's algorithm with any heap implementing
//! [`DecreaseKeyHeap`], or with the flat O(V²) scan from
//! [`crate::flat_scan`].
//!
//! # Design
//!
//! The heap is seeded with one entry per vertex up front (the source at zero,
//! everything else at [`INF`]), and a [`HandleTable`] maps each vertex id to
//! its heap handle so that relaxations can call `decrease_key` directly
//! instead of inserting duplicates.
//!
//! A run is a two-state machine: [`RunState::Running`] while extractions are
//! producing settled vertices, [`RunState::Done`] once the heap is exhausted
//! or only unreachable vertices remain. [`ForestRun::step`] exposes one
//! extraction at a time; [`ShortestPathSolver::solve`] drives it to the end.
//!
//! # Example
//!
//! ```rust
//! use fib_sssp::graph::DenseGraph;
//! use fib_sssp::pathfinding::ShortestPathSolver;
//!
//! let graph = DenseGraph::from_edges(3, &[(0, 1, 5), (0, 2, 9), (1, 2, 2)]).unwrap();
//! let paths = ShortestPathSolver::new(&graph, 0).unwrap().solve().unwrap();
//!
//! assert_eq!(paths.distances(), &[0, 5, 7]);
//! assert_eq!(paths.path_to(2), Some(vec![0, 1, 2]));
//! ```

use crate::fibonacci::PriorityForest;
use crate::flat_scan;
use crate::graph::{DenseGraph, Weight, INF};
use crate::traits::{DecreaseKeyHeap, Handle, HeapError};
use log::{debug, trace};
use thiserror::Error;

/// Errors raised while setting up or running a solver
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    #[error("source vertex {vertex} is out of range for a graph with {vertices} vertices")]
    SourceOutOfRange { vertex: usize, vertices: usize },
    #[error("heap operation failed: {0}")]
    Heap(#[from] HeapError),
}

/// Priority-selection strategy used by [`ShortestPathSolver::solve`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Linear scan over unvisited vertices each round, O(V²) total
    FlatScan,
    /// [`PriorityForest`] with decrease-key
    #[default]
    Forest,
}

/// Counters collected during a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveStats {
    /// Vertices settled; a pop that ends the run (unreachable or past the
    /// cutoff) is not counted
    pub extractions: usize,
    /// Finite edges examined
    pub relaxations: usize,
    /// Relaxations that improved a distance
    pub improvements: usize,
}

/// Result of a shortest-path run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortestPaths {
    source: usize,
    distances: Vec<Weight>,
    predecessors: Vec<Option<usize>>,
    stats: SolveStats,
}

impl ShortestPaths {
    /// Assembles a result, dropping everything beyond `max_distance`
    pub(crate) fn new(
        source: usize,
        mut distances: Vec<Weight>,
        mut predecessors: Vec<Option<usize>>,
        stats: SolveStats,
        max_distance: Option<Weight>,
    ) -> Self {
        if let Some(max) = max_distance {
            for (distance, predecessor) in distances.iter_mut().zip(predecessors.iter_mut()) {
                if *distance > max {
                    *distance = INF;
                    *predecessor = None;
                }
            }
        }
        ShortestPaths {
            source,
            distances,
            predecessors,
            stats,
        }
    }

    pub fn source(&self) -> usize {
        self.source
    }

    /// Distance per vertex, [`INF`] where unreachable
    pub fn distances(&self) -> &[Weight] {
        &self.distances
    }

    /// Distance to `vertex`, or `None` if it is unreachable
    pub fn distance(&self, vertex: usize) -> Option<Weight> {
        self.distances.get(vertex).copied().filter(|&d| d != INF)
    }

    pub fn is_reachable(&self, vertex: usize) -> bool {
        self.distance(vertex).is_some()
    }

    /// Vertex that `vertex` was last improved from
    pub fn predecessor(&self, vertex: usize) -> Option<usize> {
        self.predecessors.get(vertex).copied().flatten()
    }

    /// Vertices on a shortest path from the source to `vertex`, both inclusive
    pub fn path_to(&self, vertex: usize) -> Option<Vec<usize>> {
        self.distance(vertex)?;
        let mut path = vec![vertex];
        let mut current = vertex;
        while let Some(previous) = self.predecessor(current) {
            path.push(previous);
            current = previous;
            if path.len() > self.distances.len() {
                return None;
            }
        }
        path.reverse();
        Some(path)
    }

    pub fn stats(&self) -> SolveStats {
        self.stats
    }

    pub fn into_distances(self) -> Vec<Weight> {
        self.distances
    }
}

/// Maps vertex ids to their heap handles
///
/// Filled once while seeding the heap and never shrunk. A handle whose vertex
/// has been extracted stays in the table; the heap rejects it if it is ever
/// used again.
#[derive(Debug, Clone)]
pub struct HandleTable<H: Handle> {
    handles: Vec<Option<H>>,
}

impl<H: Handle> HandleTable<H> {
    pub fn with_capacity(capacity: usize) -> Self {
        HandleTable {
            handles: Vec::with_capacity(capacity),
        }
    }

    /// Stores the handle of `vertex`, replacing any earlier one
    pub fn record(&mut self, vertex: usize, handle: H) {
        if vertex >= self.handles.len() {
            self.handles.resize(vertex + 1, None);
        }
        self.handles[vertex] = Some(handle);
    }

    pub fn get(&self, vertex: usize) -> Option<&H> {
        self.handles.get(vertex).and_then(Option::as_ref)
    }

    /// One past the highest recorded vertex id
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// State of a [`ForestRun`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// The heap may still hold reachable vertices
    Running,
    /// Every reachable vertex has been settled
    Done,
}

/// An in-progress Dijkstra run over a decrease-key heap
///
/// The heap and the handle table live together here, so handles never
/// outlive the heap that issued them.
pub struct ForestRun<'g, H>
where
    H: DecreaseKeyHeap<usize, Weight>,
{
    graph: &'g DenseGraph,
    source: usize,
    max_distance: Option<Weight>,
    heap: H,
    handles: HandleTable<H::Handle>,
    distances: Vec<Weight>,
    predecessors: Vec<Option<usize>>,
    stats: SolveStats,
    state: RunState,
}

impl<'g, H> ForestRun<'g, H>
where
    H: DecreaseKeyHeap<usize, Weight>,
{
    /// Seeds a heap with every vertex of `graph`
    pub fn new(graph: &'g DenseGraph, source: usize) -> Result<Self, SolverError> {
        Self::with_cutoff(graph, source, None)
    }

    fn with_cutoff(
        graph: &'g DenseGraph,
        source: usize,
        max_distance: Option<Weight>,
    ) -> Result<Self, SolverError> {
        let n = graph.num_vertices();
        if source >= n {
            return Err(SolverError::SourceOutOfRange {
                vertex: source,
                vertices: n,
            });
        }

        let mut distances = vec![INF; n];
        distances[source] = 0;

        let mut heap = H::with_capacity(n);
        let mut handles = HandleTable::with_capacity(n);
        for (vertex, &distance) in distances.iter().enumerate() {
            handles.record(vertex, heap.push_with_handle(distance, vertex));
        }
        debug!("seeded heap with {n} vertices, source {source}");

        Ok(ForestRun {
            graph,
            source,
            max_distance,
            heap,
            handles,
            distances,
            predecessors: vec![None; n],
            stats: SolveStats::default(),
            state: RunState::Running,
        })
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Best distances found so far
    pub fn distances(&self) -> &[Weight] {
        &self.distances
    }

    /// Number of entries still in the heap
    pub fn pending(&self) -> usize {
        self.heap.len()
    }

    /// Extracts the closest unsettled vertex and relaxes its out-edges
    ///
    /// Returns the state after the step. Stepping a finished run is a no-op.
    pub fn step(&mut self) -> Result<RunState, SolverError> {
        if self.state == RunState::Done {
            return Ok(RunState::Done);
        }

        let Some((distance, vertex)) = self.heap.pop() else {
            return Ok(self.finish_run("heap exhausted"));
        };
        if distance == INF {
            return Ok(self.finish_run("remaining vertices are unreachable"));
        }
        if self.max_distance.is_some_and(|max| distance > max) {
            return Ok(self.finish_run("distance cutoff reached"));
        }
        self.stats.extractions += 1;
        trace!("settled vertex {vertex} at distance {distance}");

        let graph = self.graph;
        for (neighbor, weight) in graph.neighbors(vertex) {
            self.stats.relaxations += 1;
            let Some(candidate) = distance.checked_add(weight) else {
                continue;
            };
            if candidate < self.distances[neighbor] {
                self.distances[neighbor] = candidate;
                self.predecessors[neighbor] = Some(vertex);
                let handle = self.handles.get(neighbor).ok_or(HeapError::InvalidHandle)?;
                self.heap.decrease_key(handle, candidate)?;
                self.stats.improvements += 1;
            }
        }

        Ok(RunState::Running)
    }

    /// Steps until [`RunState::Done`] and returns the result
    pub fn run(mut self) -> Result<ShortestPaths, SolverError> {
        while self.step()? == RunState::Running {}
        Ok(self.into_paths())
    }

    /// Result built from the current state, whether or not the run finished
    pub fn into_paths(self) -> ShortestPaths {
        ShortestPaths::new(
            self.source,
            self.distances,
            self.predecessors,
            self.stats,
            self.max_distance,
        )
    }

    fn finish_run(&mut self, reason: &str) -> RunState {
        debug!(
            "run from {} done ({reason}): {} extractions, {} improvements, {} entries left",
            self.source,
            self.stats.extractions,
            self.stats.improvements,
            self.heap.len()
        );
        self.state = RunState::Done;
        RunState::Done
    }
}

/// Shortest-path solver over a dense graph
///
/// # Example
///
/// ```rust
/// use fib_sssp::graph::{DenseGraph, INF};
/// use fib_sssp::pathfinding::{ShortestPathSolver, Strategy};
///
/// let graph = DenseGraph::from_edges(3, &[(0, 1, 4)]).unwrap();
/// let paths = ShortestPathSolver::builder(&graph)
///     .source(0)
///     .strategy(Strategy::FlatScan)
///     .build()
///     .unwrap()
///     .solve()
///     .unwrap();
///
/// assert_eq!(paths.distances(), &[0, 4, INF]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ShortestPathSolver<'g> {
    graph: &'g DenseGraph,
    source: usize,
    strategy: Strategy,
    max_distance: Option<Weight>,
}

impl<'g> ShortestPathSolver<'g> {
    /// Solver from `source` using the default [`Strategy::Forest`]
    pub fn new(graph: &'g DenseGraph, source: usize) -> Result<Self, SolverError> {
        SolverBuilder::new(graph).source(source).build()
    }

    pub fn builder(graph: &'g DenseGraph) -> SolverBuilder<'g> {
        SolverBuilder::new(graph)
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Runs the configured strategy to completion
    pub fn solve(&self) -> Result<ShortestPaths, SolverError> {
        match self.strategy {
            Strategy::FlatScan => flat_scan::solve(self.graph, self.source, self.max_distance),
            Strategy::Forest => self.solve_with::<PriorityForest<usize, Weight>>(),
        }
    }

    /// Runs Dijkstra with an arbitrary decrease-key heap
    pub fn solve_with<H>(&self) -> Result<ShortestPaths, SolverError>
    where
        H: DecreaseKeyHeap<usize, Weight>,
    {
        self.start::<H>()?.run()
    }

    /// Seeds a heap and returns the run without stepping it
    pub fn start<H>(&self) -> Result<ForestRun<'g, H>, SolverError>
    where
        H: DecreaseKeyHeap<usize, Weight>,
    {
        ForestRun::with_cutoff(self.graph, self.source, self.max_distance)
    }
}

/// Builder for [`ShortestPathSolver`]
///
/// Defaults: source `0`, [`Strategy::Forest`], no distance cutoff.
#[derive(Debug, Clone, Copy)]
pub struct SolverBuilder<'g> {
    graph: &'g DenseGraph,
    source: usize,
    strategy: Strategy,
    max_distance: Option<Weight>,
}

impl<'g> SolverBuilder<'g> {
    pub fn new(graph: &'g DenseGraph) -> Self {
        SolverBuilder {
            graph,
            source: 0,
            strategy: Strategy::default(),
            max_distance: None,
        }
    }

    pub fn source(mut self, source: usize) -> Self {
        self.source = source;
        self
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Stops once the closest unsettled vertex is farther than `max`
    ///
    /// Vertices beyond the cutoff are reported as unreachable.
    pub fn max_distance(mut self, max: Weight) -> Self {
        self.max_distance = Some(max);
        self
    }

    pub fn build(self) -> Result<ShortestPathSolver<'g>, SolverError> {
        let vertices = self.graph.num_vertices();
        if self.source >= vertices {
            return Err(SolverError::SourceOutOfRange {
                vertex: self.source,
                vertices,
            });
        }
        Ok(ShortestPathSolver {
            graph: self.graph,
            source: self.source,
            strategy: self.strategy,
            max_distance: self.max_distance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fibonacci::ForestHandle;

    fn triangle() -> DenseGraph {
        DenseGraph::from_edges(3, &[(0, 1, 5), (0, 2, 9), (1, 2, 2)]).unwrap()
    }

    #[test]
    fn test_handle_table_records_in_order() {
        let mut forest = PriorityForest::new();
        let mut table: HandleTable<ForestHandle> = HandleTable::with_capacity(3);
        assert!(table.is_empty());
        for vertex in 0..3 {
            table.record(vertex, forest.insert(vertex as u64 + 1, vertex));
        }
        assert_eq!(table.len(), 3);
        assert!(table.get(3).is_none());

        let handle = *table.get(2).unwrap();
        forest.decrease_key(&handle, 0).unwrap();
        assert_eq!(forest.find_min(), Some((&0, &2)));
    }

    #[test]
    fn test_handle_table_records_out_of_order() {
        let mut forest = PriorityForest::new();
        let mut table: HandleTable<ForestHandle> = HandleTable::with_capacity(4);
        let late = forest.insert(30, 3);
        let early = forest.insert(10, 1);
        table.record(3, late);
        table.record(1, early);

        assert_eq!(table.len(), 4);
        assert_eq!(table.get(3), Some(&late));
        assert_eq!(table.get(1), Some(&early));
        assert_eq!(table.get(0), None);
        assert_eq!(table.get(2), None);
        assert_eq!(table.get(4), None);
    }

    #[test]
    fn test_strategies_report_same_counts() {
        // 0 -> 1 -> 2 -> 3 chain plus an isolated vertex 4.
        let graph = DenseGraph::from_edges(5, &[(0, 1, 1), (1, 2, 1), (2, 3, 1)]).unwrap();
        for cutoff in [None, Some(1)] {
            let mut builder = ShortestPathSolver::builder(&graph);
            if let Some(max) = cutoff {
                builder = builder.max_distance(max);
            }
            let forest = builder.strategy(Strategy::Forest).build().unwrap().solve().unwrap();
            let flat = builder.strategy(Strategy::FlatScan).build().unwrap().solve().unwrap();
            assert_eq!(forest.stats(), flat.stats(), "cutoff {cutoff:?}");
        }

        let full = ShortestPathSolver::new(&graph, 0).unwrap().solve().unwrap();
        assert_eq!(full.stats().extractions, 4);
    }

    #[test]
    fn test_step_machine() {
        let graph = triangle();
        let solver = ShortestPathSolver::new(&graph, 0).unwrap();
        let mut run = solver.start::<PriorityForest<usize, Weight>>().unwrap();

        assert_eq!(run.state(), RunState::Running);
        assert_eq!(run.pending(), 3);
        assert_eq!(run.distances(), &[0, INF, INF]);

        assert_eq!(run.step().unwrap(), RunState::Running);
        assert_eq!(run.distances(), &[0, 5, 9]);

        assert_eq!(run.step().unwrap(), RunState::Running);
        assert_eq!(run.distances(), &[0, 5, 7]);

        assert_eq!(run.step().unwrap(), RunState::Running);
        assert_eq!(run.step().unwrap(), RunState::Done);
        assert_eq!(run.step().unwrap(), RunState::Done);

        let paths = run.into_paths();
        assert_eq!(paths.stats().extractions, 3);
        assert_eq!(paths.stats().improvements, 3);
    }

    #[test]
    fn test_unreachable_stops_without_draining() {
        // Only 0 -> 1; vertices 2..5 are unreachable.
        let graph = DenseGraph::from_edges(5, &[(0, 1, 1)]).unwrap();
        let mut run = ShortestPathSolver::new(&graph, 0)
            .unwrap()
            .start::<PriorityForest<usize, Weight>>()
            .unwrap();
        while run.step().unwrap() == RunState::Running {}
        // Two settled vertices; the first unreachable pop ends the run.
        assert_eq!(run.pending(), 2);
        let paths = run.into_paths();
        assert_eq!(paths.distances(), &[0, 1, INF, INF, INF]);
        assert_eq!(paths.stats().extractions, 2);
    }

    #[test]
    fn test_source_out_of_range() {
        let graph = triangle();
        assert_eq!(
            ShortestPathSolver::new(&graph, 3).unwrap_err(),
            SolverError::SourceOutOfRange {
                vertex: 3,
                vertices: 3
            }
        );
        let empty = DenseGraph::new(0);
        assert!(ShortestPathSolver::new(&empty, 0).is_err());
    }

    #[test]
    fn test_paths_and_predecessors() {
        let graph = triangle();
        let paths = ShortestPathSolver::new(&graph, 0).unwrap().solve().unwrap();
        assert_eq!(paths.source(), 0);
        assert_eq!(paths.predecessor(0), None);
        assert_eq!(paths.predecessor(1), Some(0));
        assert_eq!(paths.predecessor(2), Some(1));
        assert_eq!(paths.path_to(0), Some(vec![0]));
        assert_eq!(paths.path_to(2), Some(vec![0, 1, 2]));
        assert_eq!(paths.distance(2), Some(7));
    }

    #[test]
    fn test_max_distance_cutoff() {
        // Chain 0 -1-> 1 -1-> 2 -1-> 3
        let graph = DenseGraph::from_edges(4, &[(0, 1, 1), (1, 2, 1), (2, 3, 1)]).unwrap();
        for strategy in [Strategy::Forest, Strategy::FlatScan] {
            let paths = ShortestPathSolver::builder(&graph)
                .strategy(strategy)
                .max_distance(2)
                .build()
                .unwrap()
                .solve()
                .unwrap();
            assert_eq!(paths.distances(), &[0, 1, 2, INF], "{strategy:?}");
            assert_eq!(paths.path_to(3), None);
            assert_eq!(paths.predecessor(3), None);
        }
    }

    #[test]
    fn test_zero_weight_edges() {
        let graph = DenseGraph::from_edges(3, &[(0, 1, 0), (1, 2, 0), (0, 2, 1)]).unwrap();
        let paths = ShortestPathSolver::new(&graph, 0).unwrap().solve().unwrap();
        assert_eq!(paths.distances(), &[0, 0, 0]);
    }
}
