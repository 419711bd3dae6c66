//! Road directness ("distance index") of a region.
//!
//! For every ordered pair of nodes the shortest road distance is
//! divided by the straight-line distance, giving a detour factor
//! (1.0 is perfectly direct). Each node's detour factors to the other
//! nodes are averaged into a row mean, and the row means are averaged
//! into the index, so every node carries equal weight.
//!
//! Zero is the sentinel for every pair that cannot be measured: the
//! same node, two nodes resolving to the same network node, pairs
//! with no connecting path, and pairs with no straight-line
//! separation. Such entries contribute 0 to their row rather than
//! being skipped, so a disconnected node pulls the index down.
//!
//! Row means divide by the `n - 1` other nodes, not by `n`. A plain
//! mean over the full row, diagonal included, would scale every row
//! mean and the index by `(n - 1) / n`: a two-node region whose road
//! distance is 1.25 times the straight-line distance has an index of
//! 1.25 here, and 0.625 under the full-row mean.

use crate::{
    matrix::{DistanceMatrix, Matrix, RatioMatrix},
    BikenvError,
};
use log::debug;
use roadnet::{great_circle_distance, NodeId, RegionGraph, ShortestPathTree};
use std::time::Instant;

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_meters(meters: f64) -> u32 {
    meters.round() as u32
}

/// Network node nearest to each node's own coordinates, resolved
/// once per run.
fn nearest_nodes(graph: &RegionGraph) -> Result<Vec<NodeId>, BikenvError> {
    graph
        .nodes()
        .iter()
        .map(|node| {
            graph
                .nearest_node(node.lat, node.lon)
                .ok_or(BikenvError::EmptyRegion)
        })
        .collect()
}

/// Shortest road distance, in whole meters, between every pair of
/// nodes.
pub fn road_distance_matrix(graph: &RegionGraph) -> Result<DistanceMatrix, BikenvError> {
    road_distance_matrix_with(graph, |_, _| ())
}

/// Same as [`road_distance_matrix`], calling `on_row(done, total)`
/// after each row.
///
/// One shortest-path tree is grown per row and queried for every
/// column. Its distances equal the summed edge lengths of the
/// corresponding shortest paths.
pub fn road_distance_matrix_with<F>(
    graph: &RegionGraph,
    mut on_row: F,
) -> Result<DistanceMatrix, BikenvError>
where
    F: FnMut(usize, usize),
{
    let now = Instant::now();
    let n = graph.node_count();
    let nearest = nearest_nodes(graph)?;

    let mut rows = Vec::with_capacity(n);
    for (i, &orig) in nearest.iter().enumerate() {
        let tree = ShortestPathTree::new(graph, orig)?;
        let row: Vec<u32> = nearest
            .iter()
            .enumerate()
            .map(|(j, &dest)| {
                if i == j || orig == dest {
                    0
                } else {
                    tree.distance_m(dest).map_or(0, whole_meters)
                }
            })
            .collect();
        rows.push(row);
        on_row(i + 1, n);
    }

    debug!("road matrix; n: {n}, exec: {:?}", now.elapsed());
    Ok(Matrix::from_rows(n, rows))
}

/// Great-circle distance, in whole meters, between every pair of
/// nodes.
pub fn crow_distance_matrix(graph: &RegionGraph) -> DistanceMatrix {
    let now = Instant::now();
    let nodes = graph.nodes();
    let matrix = Matrix::from_fn(nodes.len(), |i, j| {
        if i == j {
            return 0;
        }
        // Always evaluate (low, high) so the matrix is exactly symmetric.
        let (a, b) = (&nodes[i.min(j)], &nodes[i.max(j)]);
        whole_meters(great_circle_distance(a.lat, a.lon, b.lat, b.lon))
    });
    debug!("crow matrix; n: {}, exec: {:?}", nodes.len(), now.elapsed());
    matrix
}

/// Elementwise `road / crow`, with 0 wherever `crow` is 0.
///
/// # Panics
///
/// If the matrices differ in size.
pub fn ratio_matrix(road: &DistanceMatrix, crow: &DistanceMatrix) -> RatioMatrix {
    assert_eq!(road.len(), crow.len(), "matrix size mismatch");
    let (road, crow_values) = (road.values(), crow.values());
    Matrix::from_fn(crow.len(), |i, j| {
        let idx = i * crow.len() + j;
        match crow_values[idx] {
            0 => 0.0,
            c => f64::from(road[idx]) / f64::from(c),
        }
    })
}

/// Arithmetic mean of each row over its `n - 1` pairs with other
/// nodes.
///
/// The diagonal (a node paired with itself) is not a measurement and
/// is left out. A single-node region has a row mean of 0.
#[allow(clippy::cast_precision_loss)]
pub fn row_means(ratio: &RatioMatrix) -> Vec<f64> {
    let pairs = ratio.len().saturating_sub(1);
    ratio
        .rows()
        .enumerate()
        .map(|(i, row)| match pairs {
            0 => 0.0,
            _ => (row.iter().sum::<f64>() - row[i]) / pairs as f64,
        })
        .collect()
}

/// Arithmetic mean of the row means.
#[allow(clippy::cast_precision_loss)]
pub fn mean_of_means(means: &[f64]) -> Result<f64, BikenvError> {
    if means.is_empty() {
        return Err(BikenvError::EmptyRegion);
    }
    Ok(means.iter().sum::<f64>() / means.len() as f64)
}

/// Every intermediate stage of a distance index computation.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrices {
    pub road: DistanceMatrix,
    pub crow: DistanceMatrix,
    pub ratio: RatioMatrix,
    pub row_means: Vec<f64>,
}

impl DistanceMatrices {
    pub fn compute(graph: &RegionGraph) -> Result<Self, BikenvError> {
        Self::compute_with(graph, |_, _| ())
    }

    pub fn compute_with<F>(graph: &RegionGraph, on_row: F) -> Result<Self, BikenvError>
    where
        F: FnMut(usize, usize),
    {
        if graph.is_empty() {
            return Err(BikenvError::EmptyRegion);
        }
        let road = road_distance_matrix_with(graph, on_row)?;
        let crow = crow_distance_matrix(graph);
        let ratio = ratio_matrix(&road, &crow);
        let row_means = row_means(&ratio);
        Ok(Self {
            road,
            crow,
            ratio,
            row_means,
        })
    }

    /// The distance index: mean of [`Self::row_means`].
    pub fn index(&self) -> Result<f64, BikenvError> {
        mean_of_means(&self.row_means)
    }
}

/// Computes the distance index of `graph`.
pub fn distance_index(graph: &RegionGraph) -> Result<f64, BikenvError> {
    DistanceMatrices::compute(graph)?.index()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{
        crow_distance_matrix, distance_index, mean_of_means, ratio_matrix, road_distance_matrix,
        row_means, DistanceMatrices,
    };
    use crate::{matrix::Matrix, BikenvError};
    use approx::assert_relative_eq;
    use itertools::Itertools;
    use roadnet::{Edge, Node, NodeId, RegionGraph};

    /// 80 m of latitude at the equator.
    const LAT_80M: f64 = 0.000_719_5;

    pub(crate) fn node(osm_id: i64, lat: f64, lon: f64) -> Node {
        Node {
            osm_id,
            lat,
            lon,
            elevation_m: None,
        }
    }

    pub(crate) fn road(from: usize, to: usize, length_m: f64) -> Edge {
        Edge {
            from: NodeId(from),
            to: NodeId(to),
            length_m,
            travel_time_s: None,
            oneway: false,
        }
    }

    /// `size`×`size` grid with 0.001° spacing; streets 5% longer than the
    /// straight line between intersections.
    pub(crate) fn grid(size: usize) -> RegionGraph {
        let spacing_m = 111.195 * 1.05;
        let nodes = (0..size)
            .cartesian_product(0..size)
            .map(|(r, c)| node((r * size + c) as i64, r as f64 * 0.001, c as f64 * 0.001))
            .collect();
        let mut edges = Vec::new();
        for r in 0..size {
            for c in 0..size {
                let idx = r * size + c;
                if c + 1 < size {
                    edges.push(road(idx, idx + 1, spacing_m));
                }
                if r + 1 < size {
                    edges.push(road(idx, idx + size, spacing_m));
                }
            }
        }
        RegionGraph::new(nodes, edges).unwrap()
    }

    fn two_nodes() -> RegionGraph {
        RegionGraph::new(
            vec![node(1, 0.0, 0.0), node(2, LAT_80M, 0.0)],
            vec![road(0, 1, 100.0)],
        )
        .unwrap()
    }

    #[test]
    fn test_two_node_scenario() {
        let stages = DistanceMatrices::compute(&two_nodes()).unwrap();
        assert_eq!(stages.road.to_rows(), vec![vec![0, 100], vec![100, 0]]);
        assert_eq!(stages.crow.to_rows(), vec![vec![0, 80], vec![80, 0]]);
        assert_eq!(stages.ratio.to_rows(), vec![vec![0.0, 1.25], vec![1.25, 0.0]]);
        assert_eq!(stages.row_means, vec![1.25, 1.25]);
        assert_relative_eq!(stages.index().unwrap(), 1.25);
    }

    #[test]
    fn test_disconnected_node_pulls_index_down() {
        let connected = distance_index(&two_nodes()).unwrap();

        let graph = RegionGraph::new(
            vec![
                node(1, 0.0, 0.0),
                node(2, LAT_80M, 0.0),
                node(3, 0.0, 0.01),
            ],
            vec![road(0, 1, 100.0)],
        )
        .unwrap();
        let stages = DistanceMatrices::compute(&graph).unwrap();
        for k in 0..3 {
            assert_eq!(stages.road.get(2, k), Some(&0));
            assert_eq!(stages.road.get(k, 2), Some(&0));
            assert_eq!(stages.ratio.get(2, k), Some(&0.0));
            assert_eq!(stages.ratio.get(k, 2), Some(&0.0));
        }
        assert_eq!(stages.row_means[2], 0.0);
        assert!(stages.index().unwrap() < connected);
    }

    #[test]
    fn test_coincident_nodes_are_zero() {
        let graph = RegionGraph::new(
            vec![node(1, 0.0, 0.0), node(2, 0.0, 0.0), node(3, LAT_80M, 0.0)],
            vec![road(0, 2, 100.0), road(1, 2, 100.0)],
        )
        .unwrap();
        let stages = DistanceMatrices::compute(&graph).unwrap();
        assert_eq!(stages.road.get(0, 1), Some(&0));
        assert_eq!(stages.crow.get(0, 1), Some(&0));
        assert_eq!(stages.ratio.get(0, 1), Some(&0.0));
    }

    #[test]
    fn test_matrix_invariants() {
        let graph = grid(4);
        let road = road_distance_matrix(&graph).unwrap();
        let crow = crow_distance_matrix(&graph);
        let ratio = ratio_matrix(&road, &crow);
        let n = graph.node_count();
        assert_eq!((road.len(), crow.len(), ratio.len()), (n, n, n));

        for i in 0..n {
            assert_eq!(crow.get(i, i), Some(&0));
            assert_eq!(road.get(i, i), Some(&0));
            for j in 0..n {
                assert_eq!(crow.get(i, j), crow.get(j, i));
                let r = *ratio.get(i, j).unwrap();
                assert!(r.is_finite() && r >= 0.0);
                if crow.get(i, j) == Some(&0) {
                    assert_eq!(r, 0.0);
                }
            }
        }
    }

    #[test]
    fn test_grid_detours() {
        let stages = DistanceMatrices::compute(&grid(3)).unwrap();
        // Adjacent intersections: one street, 5% longer than straight.
        assert_relative_eq!(*stages.ratio.get(0, 1).unwrap(), 1.05, epsilon = 0.01);
        // Opposite corners: Manhattan detour of roughly √2 × 1.05.
        assert_relative_eq!(*stages.ratio.get(0, 8).unwrap(), 1.485, epsilon = 0.01);
        let index = stages.index().unwrap();
        assert!(index > 0.0 && index < 10.0);
    }

    #[test]
    fn test_index_is_permutation_invariant() {
        let graph = grid(3);
        let expected = distance_index(&graph).unwrap();

        // Reverse node order and relabel edges to match.
        let n = graph.node_count();
        let relabel = |id: NodeId| NodeId(n - 1 - id.0);
        let nodes = graph.nodes().iter().rev().cloned().collect();
        let edges = graph
            .edges()
            .iter()
            .map(|e| Edge {
                from: relabel(e.from),
                to: relabel(e.to),
                ..e.clone()
            })
            .collect();
        let permuted = RegionGraph::new(nodes, edges).unwrap();
        assert_relative_eq!(distance_index(&permuted).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_progress_reports_each_row() {
        let graph = grid(3);
        let mut seen = Vec::new();
        DistanceMatrices::compute_with(&graph, |done, total| seen.push((done, total))).unwrap();
        assert_eq!(seen, (1..=9).map(|done| (done, 9)).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_region() {
        let graph = RegionGraph::new(Vec::new(), Vec::new()).unwrap();
        assert!(matches!(
            distance_index(&graph),
            Err(BikenvError::EmptyRegion)
        ));
        assert!(matches!(mean_of_means(&[]), Err(BikenvError::EmptyRegion)));
    }

    #[test]
    fn test_row_means_skip_diagonal() {
        let ratio = Matrix::from_rows(
            3,
            vec![
                vec![0.0, 1.2, 1.4],
                vec![1.2, 0.0, 0.0],
                vec![1.4, 0.0, 0.0],
            ],
        );
        let means = row_means(&ratio);
        assert_relative_eq!(means[0], 1.3);
        assert_relative_eq!(means[1], 0.6);
        assert_relative_eq!(means[2], 0.7);
        assert_eq!(row_means(&Matrix::from_rows(1, vec![vec![0.0]])), vec![0.0]);
    }

    #[test]
    fn test_ratio_zero_crow() {
        let road = Matrix::from_rows(2, vec![vec![0, 50], vec![50, 0]]);
        let crow = Matrix::from_rows(2, vec![vec![0, 0], vec![40, 0]]);
        let ratio = ratio_matrix(&road, &crow);
        assert_eq!(ratio.to_rows(), vec![vec![0.0, 0.0], vec![1.25, 0.0]]);
    }
}
