//! Persisted map artifacts.
//!
//! Three JSON files are written for the rendering layer:
//!
//! - [`WIO_MAP_FILE`]: the joined `FeatureCollection`
//! - [`TIME_SERIES_FILE`]: key-indexed metric histories with nulls kept
//! - [`GRIDS_FILE`]: raw grid documents that passed validation

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::PipelineError;
use crate::assemble::SeriesByKey;
use crate::paths::ensure_dir;

pub const WIO_MAP_FILE: &str = "wio_map.json";
pub const TIME_SERIES_FILE: &str = "time_series.json";
pub const GRIDS_FILE: &str = "pds_grids.json";

/// Locations of the artifacts written by [`write_artifacts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub wio_map: PathBuf,
    pub time_series: PathBuf,
    pub grids: PathBuf,
}

impl ArtifactPaths {
    /// Artifact paths inside `dir`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            wio_map: dir.join(WIO_MAP_FILE),
            time_series: dir.join(TIME_SERIES_FILE),
            grids: dir.join(GRIDS_FILE),
        }
    }
}

/// Writes all three artifacts into `dir`, creating it if needed.
///
/// # Errors
///
/// Returns [`PipelineError`] if serialization or any file write fails.
pub fn write_artifacts(
    dir: &Path,
    feature_collection: &geojson::FeatureCollection,
    series_by_key: &SeriesByKey,
    grids: &[Value],
) -> Result<ArtifactPaths, PipelineError> {
    ensure_dir(dir)?;
    let paths = ArtifactPaths::in_dir(dir);

    write_json(&paths.wio_map, feature_collection)?;
    write_json(&paths.time_series, series_by_key)?;
    write_json(&paths.grids, grids)?;

    Ok(paths)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), PipelineError> {
    let bytes = serde_json::to_vec(value)?;
    std::fs::write(path, &bytes)?;
    log::info!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// Reads a previously written `wio_map.json`.
///
/// # Errors
///
/// Returns [`PipelineError`] if the file cannot be read or parsed.
pub fn read_feature_collection(path: &Path) -> Result<geojson::FeatureCollection, PipelineError> {
    let body = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&body)?)
}

/// Reads a previously written `pds_grids.json`.
///
/// # Errors
///
/// Returns [`PipelineError`] if the file cannot be read or parsed.
pub fn read_grid_records(path: &Path) -> Result<Vec<Value>, PipelineError> {
    let body = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&body)?)
}
