use anyhow::{anyhow, Error as AnyError};
use bikenv::roadnet::{geo::geometry::Coord, NetworkType, RegionQuery};
use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use std::{path::PathBuf, str::FromStr};

/// Compute the distance and altitude indices of a region.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("region").required(true).args(["place", "address", "center"])))]
pub struct Cli {
    /// Named place, e.g. "Cinco Esquinas de Tibás, San José, Costa Rica".
    #[arg(long)]
    pub place: Option<String>,

    /// Address to center the region on (use with --dist).
    #[arg(long)]
    pub address: Option<String>,

    /// Center "lat,lon" of the region (use with --dist).
    #[arg(long)]
    pub center: Option<LatLon>,

    /// Region radius around --address or --center, in meters.
    #[arg(long, default_value_t = 500.0)]
    pub dist: f64,

    /// Road network to analyze.
    #[arg(short, long, default_value_t = NetworkType::Drive)]
    pub network: NetworkType,

    /// Read road networks from JSON files in this directory instead
    /// of downloading them from OpenStreetMap.
    #[arg(short, long)]
    pub graph_dir: Option<PathBuf>,

    /// Where node elevations come from.
    #[arg(short, long, value_enum, default_value_t = Elevation::Google)]
    pub elevation: Elevation,

    /// Google Elevation API key.
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_key: Option<String>,

    /// Largest plausible absolute distance index.
    #[arg(long, default_value_t = 10.0)]
    pub max_index: f64,

    /// Network fetches attempted before rejecting an implausible
    /// distance index.
    #[arg(long, default_value_t = 3)]
    pub max_attempts: u32,

    #[command(subcommand)]
    pub cmd: Command,
}

impl Cli {
    pub fn query(&self) -> Result<RegionQuery, AnyError> {
        match (&self.place, &self.address, self.center) {
            (Some(place), None, None) => Ok(RegionQuery::Place(place.clone())),
            (None, Some(address), None) => Ok(RegionQuery::Address {
                address: address.clone(),
                dist_m: self.dist,
            }),
            (None, None, Some(LatLon(center))) => Ok(RegionQuery::Point {
                center,
                dist_m: self.dist,
            }),
            _ => Err(anyhow!("specify exactly one of --place, --address, --center")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Elevation {
    /// Do not compute the altitude index.
    Skip,
    /// Use elevations stored in the graph file.
    Nodes,
    /// Query the Google Elevation API.
    Google,
}

#[derive(Clone, Debug, Copy)]
pub struct LatLon(pub Coord<f64>);

impl FromStr for LatLon {
    type Err = AnyError;
    fn from_str(s: &str) -> Result<Self, AnyError> {
        let (lat_str, lon_str) = s
            .split_once(',')
            .ok_or_else(|| anyhow!("not a valid lat,lon pair"))?;
        let lat = f64::from_str(lat_str.trim())?;
        let lon = f64::from_str(lon_str.trim())?;
        Ok(Self(Coord { y: lat, x: lon }))
    }
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Print a human readable report.
    Report,

    /// Print the report as JSON.
    Json,
}
