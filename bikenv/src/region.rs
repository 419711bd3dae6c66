use crate::{
    distance::DistanceMatrices,
    elevation::{normalize_elevation, ElevationSeries},
    recompute::{recompute_until_plausible, IndexBounds},
    stats::{AltitudeIndex, ElevationStats},
    BikenvError,
};
use log::info;
use roadnet::{
    ElevationProvider, NetworkType, NodeAttributeElevation, RegionGraph, RegionQuery,
    RoadNetworkProvider,
};
use serde::Serialize;

/// A region's name and road network.
#[derive(Debug, Clone)]
pub struct Region {
    pub name: String,
    pub graph: RegionGraph,
}

impl Region {
    pub fn new(name: impl Into<String>, graph: RegionGraph) -> Self {
        Self {
            name: name.into(),
            graph,
        }
    }

    /// Fetches the road network of `query` from `provider`.
    pub fn fetch(
        provider: &dyn RoadNetworkProvider,
        query: &RegionQuery,
        network_type: NetworkType,
    ) -> Result<Self, BikenvError> {
        let graph = provider.fetch_road_network(query, network_type)?;
        info!(
            "region; name: {}, nodes: {}, edges: {}",
            query.name(),
            graph.node_count(),
            graph.edge_count()
        );
        Ok(Self::new(query.name(), graph))
    }

    pub fn distance_matrices<F>(&self, on_row: F) -> Result<DistanceMatrices, BikenvError>
    where
        F: FnMut(usize, usize),
    {
        DistanceMatrices::compute_with(&self.graph, on_row)
    }

    pub fn distance_index(&self) -> Result<f64, BikenvError> {
        self.distance_matrices(|_, _| ())?.index()
    }

    pub fn normalized_elevation(
        &self,
        provider: &dyn ElevationProvider,
    ) -> Result<ElevationSeries, BikenvError> {
        normalize_elevation(&self.graph, provider)
    }

    pub fn altitude_index(
        &self,
        provider: &dyn ElevationProvider,
    ) -> Result<AltitudeIndex, BikenvError> {
        AltitudeIndex::new(&self.normalized_elevation(provider)?)
    }

    pub fn elevation_stats(
        &self,
        provider: &dyn ElevationProvider,
    ) -> Result<ElevationStats, BikenvError> {
        ElevationStats::new(&self.normalized_elevation(provider)?)
    }
}

/// Where node elevations come from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ElevationSource {
    /// Skip the altitude index.
    #[default]
    Skip,

    /// Elevations stored on the graph's nodes.
    NodeAttributes,

    /// Google Elevation API with the given key.
    #[cfg(feature = "http")]
    Google { api_key: Option<String> },
}

impl ElevationSource {
    fn provider(&self) -> Result<Option<Box<dyn ElevationProvider>>, BikenvError> {
        let provider: Box<dyn ElevationProvider> = match self {
            Self::Skip => return Ok(None),
            Self::NodeAttributes => Box::new(NodeAttributeElevation),
            #[cfg(feature = "http")]
            Self::Google { api_key } => Box::new(roadnet::GoogleElevation::new(api_key.clone())?),
        };
        Ok(Some(provider))
    }
}

/// Everything an analysis run needs besides its providers.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub query: RegionQuery,
    pub network_type: NetworkType,
    pub elevation: ElevationSource,
    pub bounds: IndexBounds,
}

impl Config {
    pub fn new(query: RegionQuery) -> Self {
        Self {
            query,
            network_type: NetworkType::default(),
            elevation: ElevationSource::default(),
            bounds: IndexBounds::default(),
        }
    }
}

/// Outcome of [`analyze`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub region: String,
    pub nodes: usize,
    pub edges: usize,
    pub distance_index: f64,
    /// Computations needed for a plausible distance index.
    pub attempts: u32,
    pub altitude_index: Option<AltitudeIndex>,
    pub elevation_stats: Option<ElevationStats>,
}

/// Computes both indices for the region described by `config`.
///
/// The road network is fetched again from `network` whenever the
/// distance index falls outside `config.bounds`. `on_row(done, total)`
/// reports road-matrix progress.
pub fn analyze<F>(
    config: &Config,
    network: &dyn RoadNetworkProvider,
    mut on_row: F,
) -> Result<Report, BikenvError>
where
    F: FnMut(usize, usize),
{
    let elevation = config.elevation.provider()?;

    let plausible = recompute_until_plausible(&config.bounds, |_attempt| {
        let region = Region::fetch(network, &config.query, config.network_type)?;
        let index = region.distance_matrices(&mut on_row)?.index()?;
        Ok((index, region))
    })?;
    let region = plausible.output;

    let elevation_stats = elevation
        .map(|provider| region.elevation_stats(provider.as_ref()))
        .transpose()?;

    Ok(Report {
        region: region.name,
        nodes: region.graph.node_count(),
        edges: region.graph.edge_count(),
        distance_index: plausible.index,
        attempts: plausible.attempts,
        altitude_index: elevation_stats.as_ref().map(ElevationStats::altitude_index),
        elevation_stats,
    })
}
