//! Building a [`RegionGraph`] from OpenStreetMap elements.

use crate::{great_circle_distance, Edge, NetworkType, Node, NodeId, RegionGraph, RoadnetError};
use serde::Deserialize;
use std::collections::HashMap;

/// An element of an Overpass `[out:json]` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Node {
        id: i64,
        lat: f64,
        lon: f64,
    },
    Way {
        id: i64,
        nodes: Vec<i64>,
        #[serde(default)]
        tags: HashMap<String, String>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OverpassResponse {
    pub elements: Vec<Element>,
}

/// Direction a way may be travelled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Travel {
    Both,
    Forward,
    Backward,
}

fn travel(tags: &HashMap<String, String>, network_type: NetworkType) -> Travel {
    if network_type == NetworkType::Walk {
        return Travel::Both;
    }
    match tags.get("oneway").map(String::as_str) {
        Some("yes" | "true" | "1") => Travel::Forward,
        Some("-1" | "reverse") => Travel::Backward,
        Some(_) => Travel::Both,
        None if tags.get("junction").map(String::as_str) == Some("roundabout") => Travel::Forward,
        None => Travel::Both,
    }
}

/// Builds a simplified graph from OSM nodes and ways.
///
/// Only way endpoints and nodes shared between ways (or repeated
/// within one way) become graph nodes; runs of interior nodes
/// collapse into a single edge whose length is the sum of the
/// great-circle lengths of its segments.
pub fn build_graph(
    elements: &[Element],
    network_type: NetworkType,
) -> Result<RegionGraph, RoadnetError> {
    let mut coords: HashMap<i64, (f64, f64)> = HashMap::new();
    let mut ways = Vec::new();
    for element in elements {
        match element {
            Element::Node { id, lat, lon } => {
                coords.insert(*id, (*lat, *lon));
            }
            Element::Way { nodes, tags, .. } if nodes.len() > 1 => ways.push((nodes, tags)),
            Element::Way { .. } | Element::Other => (),
        }
    }

    let mut uses: HashMap<i64, u32> = HashMap::new();
    for (way_nodes, _) in &ways {
        for osm_id in way_nodes.iter() {
            *uses.entry(*osm_id).or_default() += 1;
        }
        for endpoint in [way_nodes[0], way_nodes[way_nodes.len() - 1]] {
            *uses.entry(endpoint).or_default() += 1;
        }
    }

    let mut nodes = Vec::new();
    let mut ids: HashMap<i64, NodeId> = HashMap::new();
    let mut node_id = |osm_id: i64, (lat, lon): (f64, f64)| -> NodeId {
        *ids.entry(osm_id).or_insert_with(|| {
            nodes.push(Node {
                osm_id,
                lat,
                lon,
                elevation_m: None,
            });
            NodeId(nodes.len() - 1)
        })
    };

    let mut edges = Vec::new();
    for (way_nodes, tags) in ways {
        let direction = travel(tags, network_type);
        // (graph node the current run started at, its position, run length)
        let mut run: Option<(NodeId, (f64, f64), f64)> = None;

        for osm_id in way_nodes.iter() {
            let Some(&coord) = coords.get(osm_id) else {
                // Node outside the download; restart at the next one.
                run = None;
                continue;
            };
            let junction = uses.get(osm_id).copied().unwrap_or_default() > 1;

            match run.as_mut() {
                None => {
                    run = Some((node_id(*osm_id, coord), coord, 0.0));
                }
                Some((start, last, length_m)) => {
                    *length_m += great_circle_distance(last.0, last.1, coord.0, coord.1);
                    *last = coord;
                    if junction {
                        let end = node_id(*osm_id, coord);
                        let (from, to) = match direction {
                            Travel::Backward => (end, *start),
                            Travel::Both | Travel::Forward => (*start, end),
                        };
                        edges.push(Edge {
                            from,
                            to,
                            length_m: *length_m,
                            travel_time_s: None,
                            oneway: direction != Travel::Both,
                        });
                        run = Some((end, coord, 0.0));
                    }
                }
            }
        }
    }

    RegionGraph::new(nodes, edges)
}
