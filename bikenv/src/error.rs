use roadnet::RoadnetError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BikenvError {
    #[error("region not found: {0}")]
    RegionNotFound(String),

    #[error("{0}")]
    Provider(RoadnetError),

    #[error("missing elevation data: {0}")]
    MissingElevationData(String),

    #[error("cannot compute statistics of an empty series")]
    EmptySeries,

    #[error("region has no nodes")]
    EmptyRegion,

    #[error("implausible distance index {value} after {attempts} attempts")]
    ImplausibleIndex { value: f64, attempts: u32 },
}

impl From<RoadnetError> for BikenvError {
    fn from(err: RoadnetError) -> Self {
        match err {
            RoadnetError::NotFound(region) => Self::RegionNotFound(region),
            RoadnetError::MissingElevationData(detail) => Self::MissingElevationData(detail),
            other => Self::Provider(other),
        }
    }
}
