//! Sources of road networks and node elevations.

use crate::{NodeId, RegionGraph, RoadnetError};
use geo::geometry::Coord;
use log::debug;
use std::{
    collections::HashMap,
    fmt,
    fs::File,
    io::{BufReader, ErrorKind},
    path::PathBuf,
    str::FromStr,
};

/// What area to fetch a road network for.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionQuery {
    /// A named place, e.g. "Cinco Esquinas de Tibás, San José, Costa Rica".
    Place(String),

    /// Everything within `dist_m` of a geocoded address.
    Address { address: String, dist_m: f64 },

    /// Everything within `dist_m` of a coordinate.
    Point { center: Coord<f64>, dist_m: f64 },
}

impl RegionQuery {
    /// Human readable name of the region.
    pub fn name(&self) -> String {
        match self {
            Self::Place(place) => place.clone(),
            Self::Address { address, dist_m } => format!("{address} ({dist_m} m)"),
            Self::Point { center, dist_m } => format!("{},{} ({dist_m} m)", center.y, center.x),
        }
    }
}

/// Which roads make up the network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NetworkType {
    #[default]
    Drive,
    Bike,
    Walk,
    All,
}

impl NetworkType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Drive => "drive",
            Self::Bike => "bike",
            Self::Walk => "walk",
            Self::All => "all",
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "drive" => Ok(Self::Drive),
            "bike" => Ok(Self::Bike),
            "walk" => Ok(Self::Walk),
            "all" => Ok(Self::All),
            other => Err(format!("unknown network type '{other}'")),
        }
    }
}

pub trait RoadNetworkProvider {
    /// Fetches the road network of `query`.
    fn fetch_road_network(
        &self,
        query: &RegionQuery,
        network_type: NetworkType,
    ) -> Result<RegionGraph, RoadnetError>;
}

pub trait ElevationProvider {
    /// Returns the elevation (meters) of every node in `graph`.
    fn node_elevations(&self, graph: &RegionGraph) -> Result<HashMap<NodeId, f64>, RoadnetError>;
}

/// Road networks stored as JSON files in a directory.
///
/// A query for "San José, Costa Rica" with a drive network resolves
/// to `san-jose-costa-rica-drive.json`, falling back to
/// `san-jose-costa-rica.json`.
#[derive(Debug, Clone)]
pub struct GraphFile {
    dir: PathBuf,
}

impl GraphFile {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn candidates(&self, query: &RegionQuery, network_type: NetworkType) -> Vec<PathBuf> {
        let stem = slug(&query.name());
        [format!("{stem}-{network_type}.json"), format!("{stem}.json")]
            .into_iter()
            .map(|file_name| self.dir.join(file_name))
            .collect()
    }
}

impl RoadNetworkProvider for GraphFile {
    fn fetch_road_network(
        &self,
        query: &RegionQuery,
        network_type: NetworkType,
    ) -> Result<RegionGraph, RoadnetError> {
        for path in self.candidates(query, network_type) {
            match File::open(&path) {
                Ok(file) => {
                    debug!("loading graph; path: {}", path.display());
                    return Ok(serde_json::from_reader(BufReader::new(file))?);
                }
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(RoadnetError::NotFound(query.name()))
    }
}

/// Elevations already attached to the graph's nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeAttributeElevation;

impl ElevationProvider for NodeAttributeElevation {
    fn node_elevations(&self, graph: &RegionGraph) -> Result<HashMap<NodeId, f64>, RoadnetError> {
        graph
            .node_ids()
            .zip(graph.nodes())
            .map(|(id, node)| {
                node.elevation_m.map(|elev| (id, elev)).ok_or_else(|| {
                    RoadnetError::MissingElevationData(format!("node {} has no elevation", node.osm_id))
                })
            })
            .collect()
    }
}

/// Lowercase ASCII alphanumerics joined by single dashes.
fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let c = match c {
            'á' | 'à' | 'ä' | 'â' | 'Á' => 'a',
            'é' | 'è' | 'ë' | 'ê' | 'É' => 'e',
            'í' | 'ì' | 'ï' | 'î' | 'Í' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' | 'Ó' => 'o',
            'ú' | 'ù' | 'ü' | 'û' | 'Ú' => 'u',
            'ñ' | 'Ñ' => 'n',
            c => c,
        };
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}
