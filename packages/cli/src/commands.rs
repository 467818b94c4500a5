//! Subcommand implementations shared by the flag-driven and interactive
//! entry points.

use std::path::PathBuf;

use clap::Args;
use wio_map_cli_utils::{MultiProgress, StepProgress};
use wio_map_pipeline::artifacts::{ArtifactPaths, read_feature_collection, read_grid_records};
use wio_map_pipeline::paths::output_dir_from_env;
use wio_map_region_models::Metric;
use wio_map_source::SourceConfig;
use wio_map_view::grid::{default_ranges, heatmap_points};
use wio_map_view::{
    GridCache, GridSummary, TIME_BANDS, TimeRange, class_counts, compute_breaks, filter_by_ranges,
};

/// Where to read collections from and write artifacts to.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Source config TOML (defaults to the embedded config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Read collections from `<dir>/<collection>.json`
    #[arg(long, global = true)]
    pub source_dir: Option<PathBuf>,

    /// Fetch collections from `<url>/<collection>`; wins over --source-dir
    #[arg(long, global = true)]
    pub source_url: Option<String>,

    /// Artifact directory (defaults to `$WIO_MAP_OUTPUT_DIR` or `data/generated`)
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,
}

impl SourceArgs {
    /// Layers the config file, then environment, then flags.
    fn source_config(&self) -> Result<SourceConfig, wio_map_source::SourceError> {
        Ok(SourceConfig::load(self.config.as_deref())?
            .with_env_overrides()
            .with_overrides(self.source_dir.clone(), self.source_url.clone()))
    }

    fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(output_dir_from_env)
    }

    fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths::in_dir(&self.output_dir())
    }
}

/// Fetches, joins, and writes all artifacts.
///
/// # Errors
///
/// Returns an error if the config is invalid, a collection cannot be
/// fetched, or an artifact cannot be written.
pub async fn build(
    args: &SourceArgs,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.source_config()?;
    let source = config.build_source()?;
    let output_dir = args.output_dir();

    let progress = StepProgress::steps_bar(multi, "Building map artifacts");
    let (output, paths) = wio_map_pipeline::build_artifacts(
        source.as_ref(),
        &config.collections,
        &output_dir,
        Some(progress),
    )
    .await?;

    let join = &output.assembled.join;
    println!();
    println!(
        "Units: {} ({} with series, {} without)",
        join.units, join.units_with_series, join.units_without_series
    );
    println!("Series keys without a boundary: {}", join.unmatched_series);
    if let Some(date) = &output.assembled.latest_sync {
        println!("Latest sync: {date}");
    }
    for report in [
        &output.assembled.boundary_report,
        &output.assembled.time_series_report,
        &output.grid_report,
    ] {
        println!(
            "{}: {} of {} valid",
            report.entity, report.valid, report.total
        );
    }
    println!("Wrote {}", paths.wio_map.display());
    println!("Wrote {}", paths.time_series.display());
    println!("Wrote {}", paths.grids.display());

    Ok(())
}

/// Resolves band labels to ranges. No labels selects every preset band.
///
/// # Errors
///
/// Returns an error naming the valid labels if any label is unknown.
pub fn resolve_bands(labels: &[String]) -> Result<Vec<TimeRange>, String> {
    if labels.is_empty() {
        return Ok(default_ranges());
    }

    labels
        .iter()
        .map(|label| {
            wio_map_view::grid::band_by_label(label)
                .map(|band| band.range)
                .ok_or_else(|| {
                    let valid: Vec<&str> = TIME_BANDS.iter().map(|band| band.label).collect();
                    format!("Unknown band '{label}'. Valid bands: {}", valid.join(", "))
                })
        })
        .collect()
}

/// Prints a summary of the grid cells inside the selected bands.
///
/// # Errors
///
/// Returns an error if a band label is unknown or `pds_grids.json`
/// cannot be read.
pub fn grid(args: &SourceArgs, labels: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let ranges = resolve_bands(labels)?;
    summarize_grid(args, &ranges)
}

/// Prints the summary for an already-resolved range selection.
///
/// # Errors
///
/// Returns an error if `pds_grids.json` cannot be read.
pub fn summarize_grid(
    args: &SourceArgs,
    ranges: &[TimeRange],
) -> Result<(), Box<dyn std::error::Error>> {
    let path = args.artifact_paths().grids;
    let cache = GridCache::load(&read_grid_records(&path)?);
    let cells = filter_by_ranges(&cache, ranges);
    let summary = GridSummary::of(&cells);

    let total = cache.len();
    println!("Grid cells in selection: {} of {total}", summary.cells);
    println!("Total visits: {}", summary.total_visits);
    println!("Mean hours per visit: {:.2}", summary.mean_avg_time_hours);

    let points = heatmap_points(&cells);
    log::debug!("{} heatmap points", points.len());
    if let Some(&[lng, lat, visits]) = points.iter().max_by(|a, b| a[2].total_cmp(&b[2])) {
        println!("Busiest cell: ({lat:.4}, {lng:.4}) with {visits} visits");
    }

    Ok(())
}

/// Prints equal-interval breaks and per-class feature counts.
///
/// # Errors
///
/// Returns an error if `wio_map.json` cannot be read.
pub fn breaks(
    args: &SourceArgs,
    metric: Metric,
    classes: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = args.artifact_paths().wio_map;
    let feature_collection = read_feature_collection(&path)?;

    let breaks = compute_breaks(&feature_collection, metric.as_ref(), classes);
    let counts = class_counts(&feature_collection, metric.as_ref(), &breaks);

    println!("{metric} ({} units)", feature_collection.features.len());
    for (i, (bound, count)) in breaks.iter().zip(&counts).enumerate() {
        let upper = breaks
            .get(i + 1)
            .map_or_else(|| "and above".to_string(), |next| format!("to {next:.3}"));
        println!("  class {i}: {bound:.3} {upper} ({count} units)");
    }

    Ok(())
}
