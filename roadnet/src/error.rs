use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoadnetError {
    #[error("no road network found for '{0}'")]
    NotFound(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("missing elevation data: {0}")]
    MissingElevationData(String),

    #[error("edge references unknown node {0}")]
    UnknownNode(usize),

    #[error("edge {edge} has invalid length {length_m}")]
    InvalidEdgeLength { edge: usize, length_m: f64 },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "http")]
    #[error("{0}")]
    Http(#[from] reqwest::Error),
}
