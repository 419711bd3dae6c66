//! Road networks from OpenStreetMap via Nominatim and Overpass.

use crate::{
    distance::degree_offsets,
    osm::{build_graph, OverpassResponse},
    NetworkType, RegionGraph, RegionQuery, RoadNetworkProvider, RoadnetError,
};
use log::{debug, info};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";
const OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
const USER_AGENT: &str = concat!("bikenv/", env!("CARGO_PKG_VERSION"));

/// Bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    pub fn around(lat: f64, lon: f64, dist_m: f64) -> Self {
        let (delta_lat, delta_lon) = degree_offsets(lat, dist_m);
        Self {
            south: lat - delta_lat,
            west: lon - delta_lon,
            north: lat + delta_lat,
            east: lon + delta_lon,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    /// [south, north, west, east]
    boundingbox: [String; 4],
}

fn parse_deg(value: &str) -> Result<f64, RoadnetError> {
    value
        .parse()
        .map_err(|_| RoadnetError::Provider(format!("invalid coordinate '{value}'")))
}

/// Overpass highway filter for `network_type`.
fn highway_filter(network_type: NetworkType) -> &'static str {
    match network_type {
        NetworkType::Drive => {
            r#"["highway"]["area"!~"yes"]["highway"!~"abandoned|bridleway|bus_guideway|construction|corridor|cycleway|elevator|escalator|footway|path|pedestrian|planned|platform|proposed|raceway|service|steps|track"]["motor_vehicle"!~"no"]["motorcar"!~"no"]"#
        }
        NetworkType::Bike => {
            r#"["highway"]["area"!~"yes"]["highway"!~"abandoned|bus_guideway|construction|corridor|elevator|escalator|footway|motor|planned|platform|proposed|raceway|steps"]["bicycle"!~"no"]"#
        }
        NetworkType::Walk => {
            r#"["highway"]["area"!~"yes"]["highway"!~"abandoned|bus_guideway|construction|cycleway|motor|planned|platform|proposed|raceway"]["foot"!~"no"]"#
        }
        NetworkType::All => {
            r#"["highway"]["area"!~"yes"]["highway"!~"abandoned|construction|planned|platform|proposed|raceway"]"#
        }
    }
}

fn overpass_query(bbox: &BoundingBox, network_type: NetworkType) -> String {
    let BoundingBox {
        south,
        west,
        north,
        east,
    } = bbox;
    let filter = highway_filter(network_type);
    format!("[out:json][timeout:180];(way{filter}({south},{west},{north},{east});>;);out;")
}

/// Fetches road networks from the public OSM services.
#[derive(Debug, Clone)]
pub struct Overpass {
    client: Client,
    nominatim_url: String,
    overpass_url: String,
}

impl Overpass {
    pub fn new() -> Result<Self, RoadnetError> {
        Self::with_urls(NOMINATIM_URL.to_string(), OVERPASS_URL.to_string())
    }

    pub fn with_urls(nominatim_url: String, overpass_url: String) -> Result<Self, RoadnetError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(300))
            .build()?;
        Ok(Self {
            client,
            nominatim_url,
            overpass_url,
        })
    }

    /// Returns the first Nominatim match for `query`.
    fn geocode(&self, query: &str) -> Result<Place, RoadnetError> {
        let places: Vec<Place> = self
            .client
            .get(&self.nominatim_url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()?
            .error_for_status()?
            .json()?;
        places
            .into_iter()
            .next()
            .ok_or_else(|| RoadnetError::NotFound(query.to_string()))
    }

    fn bounding_box(&self, query: &RegionQuery) -> Result<BoundingBox, RoadnetError> {
        match query {
            RegionQuery::Place(name) => {
                let Place { boundingbox, .. } = self.geocode(name)?;
                Ok(BoundingBox {
                    south: parse_deg(&boundingbox[0])?,
                    north: parse_deg(&boundingbox[1])?,
                    west: parse_deg(&boundingbox[2])?,
                    east: parse_deg(&boundingbox[3])?,
                })
            }
            RegionQuery::Address { address, dist_m } => {
                let place = self.geocode(address)?;
                let (lat, lon) = (parse_deg(&place.lat)?, parse_deg(&place.lon)?);
                Ok(BoundingBox::around(lat, lon, *dist_m))
            }
            RegionQuery::Point { center, dist_m } => {
                Ok(BoundingBox::around(center.y, center.x, *dist_m))
            }
        }
    }
}

impl RoadNetworkProvider for Overpass {
    fn fetch_road_network(
        &self,
        query: &RegionQuery,
        network_type: NetworkType,
    ) -> Result<RegionGraph, RoadnetError> {
        let bbox = self.bounding_box(query)?;
        debug!("overpass; bbox: {bbox:?}, network: {network_type}");

        let now = std::time::Instant::now();
        let response: OverpassResponse = self
            .client
            .post(&self.overpass_url)
            .form(&[("data", overpass_query(&bbox, network_type))])
            .send()?
            .error_for_status()?
            .json()?;
        let graph = build_graph(&response.elements, network_type)?;

        if graph.is_empty() {
            return Err(RoadnetError::NotFound(query.name()));
        }
        info!(
            "fetched road network; region: {}, nodes: {}, edges: {}, exec: {:?}",
            query.name(),
            graph.node_count(),
            graph.edge_count(),
            now.elapsed()
        );
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::{overpass_query, BoundingBox};
    use crate::{great_circle_distance, NetworkType};
    use approx::assert_relative_eq;

    #[test]
    fn test_bbox_around_point() {
        let bbox = BoundingBox::around(40.7128, -74.006, 300.0);
        let half_height = great_circle_distance(40.7128, -74.006, bbox.north, -74.006);
        assert_relative_eq!(half_height, 300.0, epsilon = 1e-6);
        assert!(bbox.west < -74.006 && bbox.east > -74.006);
    }

    #[test]
    fn test_query_contains_bbox_and_filter() {
        let bbox = BoundingBox {
            south: 1.0,
            west: 2.0,
            north: 3.0,
            east: 4.0,
        };
        let query = overpass_query(&bbox, NetworkType::Bike);
        assert!(query.starts_with("[out:json]"));
        assert!(query.contains("(1,2,3,4)"));
        assert!(query.contains(r#"["bicycle"!~"no"]"#));
    }
}
