use crate::RoadnetError;
use rstar::{primitives::GeomWithData, RTree};
use serde::{Deserialize, Serialize};

/// Dense index of a node in a [`RegionGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

/// Dense index of an edge in a [`RegionGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub usize);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Identifier assigned by the upstream provider (OSM node id).
    pub osm_id: i64,
    pub lat: f64,
    pub lon: f64,
    /// Elevation above sea level (meters), when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_m: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    /// Length along the road (meters).
    pub length_m: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_time_s: Option<f64>,
    /// One-way edges may only be traversed from `from` to `to`.
    #[serde(default)]
    pub oneway: bool,
}

type IndexedPoint = GeomWithData<[f64; 2], NodeId>;

/// Serialized form of a [`RegionGraph`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Road network of a region.
///
/// Immutable once built. Traversal uses a forward-star adjacency
/// where two-way edges contribute an arc in each direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "GraphData", into = "GraphData")]
pub struct RegionGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,

    /// `arcs[first_out[n]..first_out[n + 1]]` are the arcs leaving `n`.
    first_out: Vec<usize>,

    /// (edge traversed, head node).
    arcs: Vec<(EdgeId, NodeId)>,

    /// Spatial index over `[lon, lat]`.
    index: RTree<IndexedPoint>,
}

impl RegionGraph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self, RoadnetError> {
        let n = nodes.len();
        if let Some(bad) = edges
            .iter()
            .flat_map(|e| [e.from, e.to])
            .find(|node| node.0 >= n)
        {
            return Err(RoadnetError::UnknownNode(bad.0));
        }
        // Shortest paths assume non-negative weights.
        if let Some((edge, e)) = edges
            .iter()
            .enumerate()
            .find(|(_, e)| !(e.length_m.is_finite() && e.length_m >= 0.0))
        {
            return Err(RoadnetError::InvalidEdgeLength {
                edge,
                length_m: e.length_m,
            });
        }

        let mut out_degree = vec![0_usize; n];
        for edge in &edges {
            out_degree[edge.from.0] += 1;
            if !edge.oneway {
                out_degree[edge.to.0] += 1;
            }
        }

        let mut first_out = Vec::with_capacity(n + 1);
        first_out.push(0);
        for degree in &out_degree {
            let last = first_out[first_out.len() - 1];
            first_out.push(last + degree);
        }

        let mut cursor = first_out[..n].to_vec();
        let mut arcs = vec![(EdgeId(0), NodeId(0)); first_out[n]];
        for (idx, edge) in edges.iter().enumerate() {
            arcs[cursor[edge.from.0]] = (EdgeId(idx), edge.to);
            cursor[edge.from.0] += 1;
            if !edge.oneway {
                arcs[cursor[edge.to.0]] = (EdgeId(idx), edge.from);
                cursor[edge.to.0] += 1;
            }
        }

        let index = RTree::bulk_load(
            nodes
                .iter()
                .enumerate()
                .map(|(idx, node)| IndexedPoint::new([node.lon, node.lat], NodeId(idx)))
                .collect(),
        );

        Ok(Self {
            nodes,
            edges,
            first_out,
            arcs,
            index,
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0)
    }

    pub fn node_ids(&self) -> impl ExactSizeIterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Arcs leaving `node` as (edge, head) pairs.
    pub(crate) fn arcs(&self, node: NodeId) -> &[(EdgeId, NodeId)] {
        &self.arcs[self.first_out[node.0]..self.first_out[node.0 + 1]]
    }

    /// Returns the network node closest to (`lat`, `lon`), or `None`
    /// for an empty graph.
    ///
    /// Distances are planar in degrees, which is adequate at city
    /// scale.
    pub fn nearest_node(&self, lat: f64, lon: f64) -> Option<NodeId> {
        self.index
            .nearest_neighbor(&[lon, lat])
            .map(|point| point.data)
    }
}

impl TryFrom<GraphData> for RegionGraph {
    type Error = RoadnetError;

    fn try_from(GraphData { nodes, edges }: GraphData) -> Result<Self, RoadnetError> {
        Self::new(nodes, edges)
    }
}

impl From<RegionGraph> for GraphData {
    fn from(graph: RegionGraph) -> Self {
        Self {
            nodes: graph.nodes,
            edges: graph.edges,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{Edge, GraphData, Node, NodeId, RegionGraph};
    use crate::RoadnetError;

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

    pub(crate) fn oneway(from: usize, to: usize, length_m: f64) -> Edge {
        Edge {
            oneway: true,
            ..road(from, to, length_m)
        }
    }

    #[test]
    fn test_two_way_edges_have_return_arc() {
        let graph = RegionGraph::new(
            vec![node(1, 0.0, 0.0), node(2, 0.0, 0.001), node(3, 0.0, 0.002)],
            vec![road(0, 1, 110.0), oneway(1, 2, 110.0)],
        )
        .unwrap();
        assert_eq!(graph.arcs(NodeId(0)).len(), 1);
        assert_eq!(graph.arcs(NodeId(1)).len(), 2);
        assert!(graph.arcs(NodeId(2)).is_empty());
    }

    #[test]
    fn test_unknown_node_is_rejected() {
        let err = RegionGraph::new(vec![node(1, 0.0, 0.0)], vec![road(0, 4, 1.0)]).unwrap_err();
        assert!(matches!(err, RoadnetError::UnknownNode(4)));
    }

    #[test]
    fn test_invalid_edge_length_is_rejected() {
        let nodes = vec![node(1, 0.0, 0.0), node(2, 0.0, 0.001)];
        let err = RegionGraph::new(nodes.clone(), vec![road(0, 1, 1.0), road(0, 1, -5.0)])
            .unwrap_err();
        assert!(matches!(
            err,
            RoadnetError::InvalidEdgeLength { edge: 1, length_m } if length_m == -5.0
        ));
        assert!(RegionGraph::new(nodes.clone(), vec![road(0, 1, f64::NAN)]).is_err());
        assert!(RegionGraph::new(nodes.clone(), vec![oneway(0, 1, f64::INFINITY)]).is_err());
        assert!(RegionGraph::new(nodes, vec![road(0, 1, 0.0)]).is_ok());

        let json = r#"{
            "nodes": [
                {"osm_id": 1, "lat": 0.0, "lon": 0.0},
                {"osm_id": 2, "lat": 0.0, "lon": 0.001}
            ],
            "edges": [{"from": 0, "to": 1, "length_m": -5.0}]
        }"#;
        assert!(serde_json::from_str::<RegionGraph>(json).is_err());
    }

    #[test]
    fn test_nearest_node() {
        let graph = RegionGraph::new(
            vec![node(1, 9.93, -84.08), node(2, 9.94, -84.07)],
            Vec::new(),
        )
        .unwrap();
        assert_eq!(graph.nearest_node(9.9301, -84.0799), Some(NodeId(0)));
        assert_eq!(graph.nearest_node(9.95, -84.06), Some(NodeId(1)));

        let empty = RegionGraph::new(Vec::new(), Vec::new()).unwrap();
        assert_eq!(empty.nearest_node(0.0, 0.0), None);
    }

    #[test]
    fn test_json_round_trip_rebuilds_index() {
        let graph = RegionGraph::new(
            vec![node(1, 0.0, 0.0), node(2, 0.0, 0.001)],
            vec![road(0, 1, 111.0)],
        )
        .unwrap();
        let json = serde_json::to_string(&graph).unwrap();
        let parsed: RegionGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.nodes(), graph.nodes());
        assert_eq!(parsed.edges(), graph.edges());
        assert_eq!(parsed.nearest_node(0.0, 0.0009), Some(NodeId(1)));
    }

    #[test]
    fn test_invalid_json_graph() {
        let data = GraphData {
            nodes: vec![node(1, 0.0, 0.0)],
            edges: vec![road(0, 1, 1.0)],
        };
        let json = serde_json::to_string(&data).unwrap();
        assert!(serde_json::from_str::<RegionGraph>(&json).is_err());
    }
}
