//! # Biking environment
//!
//! `bikenv` quantifies environmental factors that affect cycling in
//! a region:
//!
//! - the **distance index**, the mean detour factor of the road
//!   network (road distance over straight-line distance, averaged per
//!   node and then across nodes; lower is more direct), and
//! - the **altitude index**, the variance and standard deviation of
//!   node elevations around the regional mean.

pub mod distance;
pub mod elevation;
mod error;
pub mod matrix;
pub mod recompute;
mod region;
pub mod stats;

pub use crate::{
    distance::{distance_index, DistanceMatrices},
    elevation::{normalize_elevation, ElevationSeries},
    error::BikenvError,
    matrix::{DistanceMatrix, Matrix, RatioMatrix},
    recompute::IndexBounds,
    region::{analyze, Config, ElevationSource, Region, Report},
    stats::{AltitudeIndex, ElevationStats},
};
pub use roadnet;
