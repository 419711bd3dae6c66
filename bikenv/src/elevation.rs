use crate::BikenvError;
use log::debug;
use roadnet::{ElevationProvider, NodeId, RegionGraph, RoadnetError};
use serde::Serialize;

/// Node elevations relative to the regional mean.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElevationSeries {
    /// Mean elevation subtracted from every node (meters).
    pub mean_m: f64,

    /// Normalized elevation of each node, in node order (meters).
    pub normalized_m: Vec<f64>,
}

impl ElevationSeries {
    /// Subtracts the mean of `elevations_m` from each value.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_elevations(elevations_m: &[f64]) -> Result<Self, BikenvError> {
        if elevations_m.is_empty() {
            return Err(BikenvError::EmptySeries);
        }
        let mean_m = elevations_m.iter().sum::<f64>() / elevations_m.len() as f64;
        let normalized_m = elevations_m.iter().map(|elev| elev - mean_m).collect();
        Ok(Self {
            mean_m,
            normalized_m,
        })
    }

    pub fn len(&self) -> usize {
        self.normalized_m.len()
    }

    pub fn is_empty(&self) -> bool {
        self.normalized_m.is_empty()
    }
}

/// Fetches every node's elevation from `provider` and normalizes it.
///
/// Any provider failure (no key, rate limiting, transport errors) and
/// any node the provider has no value for is `MissingElevationData`;
/// nothing is filled in.
pub fn normalize_elevation(
    graph: &RegionGraph,
    provider: &dyn ElevationProvider,
) -> Result<ElevationSeries, BikenvError> {
    let elevations = provider.node_elevations(graph).map_err(|err| match err {
        RoadnetError::MissingElevationData(detail) => BikenvError::MissingElevationData(detail),
        other => BikenvError::MissingElevationData(other.to_string()),
    })?;
    let ordered = graph
        .node_ids()
        .map(|id: NodeId| {
            elevations.get(&id).copied().ok_or_else(|| {
                BikenvError::MissingElevationData(format!("no elevation for node {}", id.0))
            })
        })
        .collect::<Result<Vec<f64>, BikenvError>>()?;
    let series = ElevationSeries::from_elevations(&ordered)?;
    debug!(
        "normalized elevation; nodes: {}, mean: {:.2} m",
        series.len(),
        series.mean_m
    );
    Ok(series)
}
