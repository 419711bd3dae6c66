//! Length-weighted shortest paths.

use crate::{EdgeId, NodeId, RegionGraph, RoadnetError};
use keyed_priority_queue::KeyedPriorityQueue;
use std::cmp::Ordering;

/// Tentative path length; ordered so the shortest pops first.
#[derive(Debug, Clone, Copy)]
struct Distance(f64);

impl PartialEq for Distance {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Distance {}

impl Ord for Distance {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0).reverse()
    }
}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest paths from one source to every node of a graph.
#[derive(Debug, Clone)]
pub struct ShortestPathTree {
    source: NodeId,

    /// Path length from `source`; `f64::INFINITY` when unreachable.
    distances_m: Vec<f64>,

    /// Edge used to reach each node and the node it was reached from.
    predecessors: Vec<Option<(EdgeId, NodeId)>>,
}

impl ShortestPathTree {
    /// Runs Dijkstra over edge lengths from `source`.
    pub fn new(graph: &RegionGraph, source: NodeId) -> Result<Self, RoadnetError> {
        let node_count = graph.node_count();
        if source.0 >= node_count {
            return Err(RoadnetError::UnknownNode(source.0));
        }

        let mut distances_m = vec![f64::INFINITY; node_count];
        let mut predecessors = vec![None; node_count];
        let mut queue = KeyedPriorityQueue::new();

        distances_m[source.0] = 0.0;
        queue.push(source, Distance(0.0));

        while let Some((current, Distance(current_m))) = queue.pop() {
            for &(edge, head) in graph.arcs(current) {
                let length_m = graph.edges()[edge.0].length_m;
                let candidate_m = current_m + length_m;
                if candidate_m < distances_m[head.0] {
                    distances_m[head.0] = candidate_m;
                    predecessors[head.0] = Some((edge, current));
                    // Replaces the priority if `head` is already queued.
                    queue.push(head, Distance(candidate_m));
                }
            }
        }

        Ok(Self {
            source,
            distances_m,
            predecessors,
        })
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    /// Path length to `dest` in meters, or `None` if unreachable.
    pub fn distance_m(&self, dest: NodeId) -> Option<f64> {
        self.distances_m
            .get(dest.0)
            .copied()
            .filter(|d| d.is_finite())
    }

    /// Edges from the source to `dest`, in travel order.
    ///
    /// The path from the source to itself is empty.
    pub fn path_to(&self, dest: NodeId) -> Option<Vec<EdgeId>> {
        self.distance_m(dest)?;
        let mut path = Vec::new();
        let mut current = dest;
        while current != self.source {
            let (edge, prev) = self.predecessors[current.0]?;
            path.push(edge);
            current = prev;
        }
        path.reverse();
        Some(path)
    }
}

/// Returns the length-weighted shortest path from `origin` to
/// `destination`, or `None` if no path exists.
pub fn shortest_path(
    graph: &RegionGraph,
    origin: NodeId,
    destination: NodeId,
) -> Result<Option<Vec<EdgeId>>, RoadnetError> {
    if destination.0 >= graph.node_count() {
        return Err(RoadnetError::UnknownNode(destination.0));
    }
    Ok(ShortestPathTree::new(graph, origin)?.path_to(destination))
}

/// Sum of edge lengths along `path`, in meters.
pub fn edge_length_sum(graph: &RegionGraph, path: &[EdgeId]) -> f64 {
    path.iter()
        .filter_map(|&edge| graph.edge(edge))
        .map(|edge| edge.length_m)
        .sum()
}
