//! Node elevations from the Google Elevation API.

use crate::{ElevationProvider, NodeId, RegionGraph, RoadnetError};
use log::debug;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::collections::HashMap;

const ELEVATION_URL: &str = "https://maps.googleapis.com/maps/api/elevation/json";

/// Most locations sent per request.
pub const MAX_LOCATIONS_PER_BATCH: usize = 350;

#[derive(Debug, Deserialize)]
struct ElevationResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<ElevationResult>,
}

#[derive(Debug, Deserialize)]
struct ElevationResult {
    elevation: f64,
}

impl ElevationResponse {
    fn into_elevations(self, expected: usize) -> Result<Vec<f64>, RoadnetError> {
        let detail = || match &self.error_message {
            Some(msg) => format!("{}: {msg}", self.status),
            None => self.status.clone(),
        };
        match self.status.as_str() {
            "OK" => (),
            "REQUEST_DENIED" | "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" => {
                return Err(RoadnetError::MissingElevationData(detail()))
            }
            _ => return Err(RoadnetError::Provider(detail())),
        }
        if self.results.len() != expected {
            return Err(RoadnetError::Provider(format!(
                "requested {expected} elevations, got {}",
                self.results.len()
            )));
        }
        Ok(self.results.into_iter().map(|r| r.elevation).collect())
    }
}

/// Queries elevations with an explicit API key.
#[derive(Debug, Clone)]
pub struct GoogleElevation {
    client: Client,
    api_key: Option<String>,
    url: String,
}

impl GoogleElevation {
    pub fn new(api_key: Option<String>) -> Result<Self, RoadnetError> {
        Self::with_url(api_key, ELEVATION_URL.to_string())
    }

    pub fn with_url(api_key: Option<String>, url: String) -> Result<Self, RoadnetError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            api_key,
            url,
        })
    }
}

/// `lat,lon|lat,lon|...` with five decimals (about one meter).
fn locations(batch: &[(f64, f64)]) -> String {
    batch
        .iter()
        .map(|(lat, lon)| format!("{lat:.5},{lon:.5}"))
        .collect::<Vec<_>>()
        .join("|")
}

impl ElevationProvider for GoogleElevation {
    fn node_elevations(&self, graph: &RegionGraph) -> Result<HashMap<NodeId, f64>, RoadnetError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            RoadnetError::MissingElevationData("no Google Elevation API key".to_string())
        })?;

        let coords: Vec<(f64, f64)> = graph.nodes().iter().map(|n| (n.lat, n.lon)).collect();
        let mut elevations = HashMap::with_capacity(coords.len());
        for (batch_idx, batch) in coords.chunks(MAX_LOCATIONS_PER_BATCH).enumerate() {
            debug!("elevation batch; idx: {batch_idx}, len: {}", batch.len());
            let response: ElevationResponse = self
                .client
                .get(&self.url)
                .query(&[("locations", locations(batch).as_str()), ("key", api_key)])
                .send()?
                .error_for_status()?
                .json()?;
            let offset = batch_idx * MAX_LOCATIONS_PER_BATCH;
            for (idx, elevation) in response.into_elevations(batch.len())?.into_iter().enumerate() {
                elevations.insert(NodeId(offset + idx), elevation);
            }
        }
        Ok(elevations)
    }
}
