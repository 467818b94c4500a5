#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Data-join pipeline for the Western Indian Ocean fisheries map.
//!
//! Reconciles three sources into the artifacts the map view renders:
//!
//! 1. boundary polygons keyed by (country, level 1, level 2)
//! 2. regional survey time series with nullable metrics
//! 3. GPS grid aggregates, passed through after validation
//!
//! Each raw document is normalized once ([`normalize`]), validated
//! ([`validate`]), grouped chronologically by canonical key ([`index`]),
//! and joined onto its boundary ([`assemble`]). Record-level problems
//! are counted and logged; only source I/O failures abort a run.

pub mod artifacts;
pub mod assemble;
pub mod index;
pub mod normalize;
pub mod paths;
pub mod validate;

use std::path::Path;
use std::sync::Arc;

use wio_map_source::progress::ProgressCallback;
use wio_map_source::{CollectionNames, DocumentSource, RawCollections, SourceError, fetch_all};

use crate::artifacts::{ArtifactPaths, write_artifacts};
use crate::assemble::{Assembled, assemble};
use crate::validate::{ValidationReport, prepare_grids};

/// Errors that abort a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Fetching a source collection failed.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Writing or reading an artifact failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything a run produced, before it is written to disk.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub assembled: Assembled,
    /// Grid documents that passed validation, unmodified.
    pub grids: Vec<serde_json::Value>,
    pub grid_report: ValidationReport,
}

/// Number of progress steps reported by [`build_artifacts`].
const BUILD_STEPS: u64 = 3;

/// Fetches all collections and assembles the map data.
///
/// # Errors
///
/// Returns [`PipelineError::Source`] if any collection cannot be fetched.
pub async fn run(
    source: &dyn DocumentSource,
    collections: &CollectionNames,
) -> Result<PipelineOutput, PipelineError> {
    let raw = fetch_all(source, collections).await?;
    Ok(process(&raw))
}

/// Transforms fetched collections. Never fails: invalid records are
/// dropped and reported.
#[must_use]
pub fn process(raw: &RawCollections) -> PipelineOutput {
    let assembled = assemble(&raw.boundaries, &raw.time_series);
    let (grids, grid_report) = prepare_grids(&raw.grids);
    grid_report.log();

    PipelineOutput {
        assembled,
        grids,
        grid_report,
    }
}

/// Runs the pipeline and writes the artifacts into `output_dir`.
///
/// # Errors
///
/// Returns [`PipelineError`] if fetching or writing fails.
pub async fn build_artifacts(
    source: &dyn DocumentSource,
    collections: &CollectionNames,
    output_dir: &Path,
    progress: Option<Arc<dyn ProgressCallback>>,
) -> Result<(PipelineOutput, ArtifactPaths), PipelineError> {
    let progress = progress.unwrap_or_else(wio_map_source::progress::null_progress);
    progress.set_total(BUILD_STEPS);

    progress.set_message(format!("Fetching from {}", source.describe()));
    let raw = fetch_all(source, collections).await?;
    progress.inc(1);

    progress.set_message("Joining boundaries and time series".to_string());
    let output = process(&raw);
    progress.inc(1);

    progress.set_message(format!("Writing artifacts to {}", output_dir.display()));
    let paths = write_artifacts(
        output_dir,
        &output.assembled.feature_collection,
        &output.assembled.series_by_key,
        &output.grids,
    )?;
    progress.inc(1);

    progress.finish(format!(
        "{} units, {} series, {} grid cells",
        output.assembled.join.units,
        output.assembled.series_by_key.len(),
        output.grids.len()
    ));

    Ok((output, paths))
}
