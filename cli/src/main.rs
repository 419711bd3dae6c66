mod options;
mod progress;

use anyhow::Error as AnyError;
use bikenv::{
    analyze,
    roadnet::{GraphFile, Overpass, RoadNetworkProvider},
    Config, ElevationSource, IndexBounds, Report,
};
use clap::Parser;
use log::info;
use options::{Cli, Command as CliCmd, Elevation};
use std::io::Write;

fn main() -> Result<(), AnyError> {
    env_logger::init();

    let cli = Cli::parse();
    let query = cli.query()?;
    let Cli {
        network,
        graph_dir,
        elevation,
        google_key,
        max_index,
        max_attempts,
        cmd,
        ..
    } = cli;

    let config = Config {
        query,
        network_type: network,
        elevation: match elevation {
            Elevation::Skip => ElevationSource::Skip,
            Elevation::Nodes => ElevationSource::NodeAttributes,
            Elevation::Google => ElevationSource::Google {
                api_key: google_key,
            },
        },
        bounds: IndexBounds {
            max_abs: max_index,
            max_attempts,
        },
    };

    let provider: Box<dyn RoadNetworkProvider> = match graph_dir {
        Some(dir) => Box::new(GraphFile::new(dir)),
        None => Box::new(Overpass::new()?),
    };

    let pb = progress::row_bar(config.query.name());
    let report = analyze(&config, provider.as_ref(), |done, total| {
        pb.set_length(total as u64);
        pb.set_position(done as u64);
    })?;
    pb.finish_and_clear();
    info!(
        "analyzed; region: {}, nodes: {}, distance index: {:.4}, attempts: {}",
        report.region, report.nodes, report.distance_index, report.attempts
    );

    match cmd {
        CliCmd::Report => print_report(&report)?,
        CliCmd::Json => print_json(&report)?,
    }
    Ok(())
}

fn print_report(report: &Report) -> Result<(), AnyError> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "Region:          {}", report.region)?;
    writeln!(
        stdout,
        "Network:         {} nodes, {} edges",
        report.nodes, report.edges
    )?;
    writeln!(
        stdout,
        "Distance index:  {:.4} ({} attempt(s))",
        report.distance_index, report.attempts
    )?;
    match &report.elevation_stats {
        Some(stats) => {
            writeln!(stdout, "Mean elevation:  {:.2} m", stats.mean_m)?;
            writeln!(stdout, "Variance:        {:.4}", stats.variance)?;
            writeln!(stdout, "Std deviation:   {:.4}", stats.std_dev)?;
            writeln!(stdout, "Skewness:        {:.4}", stats.skewness)?;
            writeln!(stdout, "Kurtosis:        {:.4}", stats.kurtosis)?;
        }
        None => writeln!(stdout, "Altitude index:  skipped")?,
    }
    Ok(())
}

fn print_json(report: &Report) -> Result<(), AnyError> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}
