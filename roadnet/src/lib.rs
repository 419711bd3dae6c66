//! # Road networks
//!
//! `roadnet` holds the road-network graph of a region together with
//! the routing and geodesy primitives needed to analyze it, and the
//! providers that fetch networks and node elevations.

mod distance;
mod error;
mod graph;
pub mod osm;
mod provider;
mod route;

#[cfg(feature = "http")]
mod google;
#[cfg(feature = "http")]
mod overpass;

pub use crate::{
    distance::great_circle_distance,
    error::RoadnetError,
    graph::{Edge, EdgeId, GraphData, Node, NodeId, RegionGraph},
    provider::{
        ElevationProvider, GraphFile, NetworkType, NodeAttributeElevation, RegionQuery,
        RoadNetworkProvider,
    },
    route::{edge_length_sum, shortest_path, ShortestPathTree},
};
pub use geo;

#[cfg(feature = "http")]
pub use crate::{
    google::{GoogleElevation, MAX_LOCATIONS_PER_BATCH},
    overpass::{BoundingBox, Overpass},
};
