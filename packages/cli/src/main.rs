#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `wio_map`: builds the WIO fisheries map artifacts and inspects them.
//!
//! Run with a subcommand for scripted use, or with none for an
//! interactive menu. Log output goes through
//! [`wio_map_cli_utils::init_logger`] so it never tears progress bars.

mod commands;
mod interactive;

use clap::{Parser, Subcommand};
use wio_map_region_models::Metric;

use crate::commands::SourceArgs;

#[derive(Parser)]
#[command(
    name = "wio_map",
    about = "WIO small-scale fisheries map data pipeline"
)]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch all collections, join them, and write the map artifacts
    Build,
    /// Summarize grid cells whose average time falls in the given bands
    Grid {
        /// Band label (repeatable); all bands when omitted
        #[arg(long = "band")]
        bands: Vec<String>,
    },
    /// Print equal-interval choropleth breaks for a metric
    Breaks {
        #[arg(long, default_value = "mean_cpue")]
        metric: Metric,

        #[arg(long, default_value_t = 5)]
        classes: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = wio_map_cli_utils::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Build) => commands::build(&cli.source, &multi).await?,
        Some(Commands::Grid { bands }) => commands::grid(&cli.source, &bands)?,
        Some(Commands::Breaks { metric, classes }) => {
            commands::breaks(&cli.source, metric, classes)?;
        }
        None => interactive::run(&cli.source, &multi).await?,
    }

    Ok(())
}
