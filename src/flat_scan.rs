//! O(V²) Dijkstra without a priority queue
//!
//! Every round scans all vertices for the unvisited one with the smallest
//! finite distance. On dense graphs this matches the heap-based solver
//! asymptotically and serves as its correctness baseline.

use crate::graph::{DenseGraph, Weight, INF};
use crate::pathfinding::{ShortestPaths, SolveStats, SolverError};
use log::debug;

/// Shortest paths from `source` by linear scanning
///
/// Stops when no unvisited vertex has a finite distance, or when the closest
/// one is farther than `max_distance`.
pub fn solve(
    graph: &DenseGraph,
    source: usize,
    max_distance: Option<Weight>,
) -> Result<ShortestPaths, SolverError> {
    let n = graph.num_vertices();
    if source >= n {
        return Err(SolverError::SourceOutOfRange {
            vertex: source,
            vertices: n,
        });
    }

    let mut distances = vec![INF; n];
    let mut predecessors = vec![None; n];
    let mut visited = vec![false; n];
    let mut stats = SolveStats::default();
    distances[source] = 0;

    while let Some(vertex) = closest_unvisited(&distances, &visited) {
        let distance = distances[vertex];
        if max_distance.is_some_and(|max| distance > max) {
            break;
        }
        visited[vertex] = true;
        stats.extractions += 1;

        for (neighbor, weight) in graph.neighbors(vertex) {
            stats.relaxations += 1;
            let Some(candidate) = distance.checked_add(weight) else {
                continue;
            };
            if candidate < distances[neighbor] {
                distances[neighbor] = candidate;
                predecessors[neighbor] = Some(vertex);
                stats.improvements += 1;
            }
        }
    }

    debug!(
        "flat scan from {source} done: {} extractions, {} improvements",
        stats.extractions, stats.improvements
    );
    Ok(ShortestPaths::new(
        source,
        distances,
        predecessors,
        stats,
        max_distance,
    ))
}

fn closest_unvisited(distances: &[Weight], visited: &[bool]) -> Option<usize> {
    distances
        .iter()
        .zip(visited)
        .enumerate()
        .filter(|&(_, (&distance, &done))| !done && distance != INF)
        .min_by_key(|&(_, (&distance, _))| distance)
        .map(|(vertex, _)| vertex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle() {
        let graph = DenseGraph::from_edges(3, &[(0, 1, 5), (0, 2, 9), (1, 2, 2)]).unwrap();
        let paths = solve(&graph, 0, None).unwrap();
        assert_eq!(paths.distances(), &[0, 5, 7]);
        assert_eq!(paths.stats().extractions, 3);
    }

    #[test]
    fn test_unreachable_vertex_is_never_selected() {
        let graph = DenseGraph::from_edges(3, &[(0, 1, 1), (1, 0, 1)]).unwrap();
        let paths = solve(&graph, 1, None).unwrap();
        assert_eq!(paths.distances(), &[1, 0, INF]);
        assert_eq!(paths.stats().extractions, 2);
    }

    #[test]
    fn test_closest_unvisited_prefers_first_on_ties() {
        let distances = [4, 2, 2, INF];
        assert_eq!(closest_unvisited(&distances, &[false; 4]), Some(1));
        assert_eq!(closest_unvisited(&distances, &[false, true, false, false]), Some(2));
        assert_eq!(closest_unvisited(&distances, &[true, true, true, false]), None);
    }

    #[test]
    fn test_source_out_of_range() {
        let graph = DenseGraph::new(2);
        assert!(matches!(
            solve(&graph, 5, None),
            Err(SolverError::SourceOutOfRange { vertex: 5, vertices: 2 })
        ));
    }
}
