#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Document sources for the WIO map pipeline.
//!
//! The backing store is opaque: each collection (boundaries, regional
//! time series, GPS grid aggregates) is fetched in full as a JSON array.
//! A [`DocumentSource`] hides whether that array comes from a directory
//! of exported files or from an HTTP endpoint.

pub mod config;
pub mod directory;
pub mod http;
pub mod progress;

use async_trait::async_trait;

pub use config::{BackendConfig, CollectionNames, SourceConfig};

/// Errors that can occur while fetching source collections.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Source configuration could not be parsed.
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// The payload was valid JSON but not a collection of documents.
    #[error("Conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// A store that returns whole collections of JSON documents.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Human-readable description of where documents come from.
    fn describe(&self) -> String;

    /// Fetches every document in `collection`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the collection cannot be read or is not
    /// a JSON array of documents.
    async fn fetch_collection(
        &self,
        collection: &str,
    ) -> Result<Vec<serde_json::Value>, SourceError>;
}

/// Raw documents for the three pipeline inputs.
#[derive(Debug, Clone, Default)]
pub struct RawCollections {
    /// Boundary features (`GeoJSON` features or flat documents).
    pub boundaries: Vec<serde_json::Value>,
    /// Regional time-series records.
    pub time_series: Vec<serde_json::Value>,
    /// GPS grid aggregates.
    pub grids: Vec<serde_json::Value>,
}

/// Fetches all three collections concurrently.
///
/// The requests are independent; any failure aborts the whole fetch.
///
/// # Errors
///
/// Returns the first [`SourceError`] raised by any of the fetches.
pub async fn fetch_all(
    source: &dyn DocumentSource,
    collections: &CollectionNames,
) -> Result<RawCollections, SourceError> {
    log::info!("Fetching collections from {}", source.describe());

    let (boundaries, time_series, grids) = tokio::try_join!(
        source.fetch_collection(&collections.boundaries),
        source.fetch_collection(&collections.time_series),
        source.fetch_collection(&collections.grids),
    )?;

    log::info!(
        "Fetched {} boundaries, {} time-series records, {} grid cells",
        boundaries.len(),
        time_series.len(),
        grids.len()
    );

    Ok(RawCollections {
        boundaries,
        time_series,
        grids,
    })
}

/// Pulls the document list out of a parsed collection payload.
///
/// Accepts a bare array, a `GeoJSON` `FeatureCollection` (`features`), or
/// an envelope object with a `documents` array.
///
/// # Errors
///
/// Returns [`SourceError::Conversion`] if no document array is found.
pub fn extract_documents(
    json: serde_json::Value,
    label: &str,
) -> Result<Vec<serde_json::Value>, SourceError> {
    match json {
        serde_json::Value::Array(docs) => Ok(docs),
        serde_json::Value::Object(mut obj) => {
            for field in ["features", "documents"] {
                if let Some(serde_json::Value::Array(docs)) = obj.remove(field) {
                    return Ok(docs);
                }
            }
            Err(SourceError::Conversion {
                message: format!("No document array in {label}"),
            })
        }
        other => Err(SourceError::Conversion {
            message: format!("Expected an array in {label}, found {}", type_name(&other)),
        }),
    }
}

const fn type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
