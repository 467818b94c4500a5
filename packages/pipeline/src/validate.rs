//! Record validation for the three source entity types.
//!
//! Invalid records never abort a run. They are dropped, counted in a
//! [`ValidationReport`], and the first one is kept for diagnostics.

use serde::Serialize;
use serde_json::Value;
use strum_macros::{AsRefStr, Display};
use wio_map_region_models::{AdminIdentity, GridCell, TimeSeriesRecord};

use crate::normalize::{
    DATE_FIELD, JsonObject, identity_of, metrics_of, normalize_date, normalize_identity_fields,
};

/// Maximum length of an invalid-record sample in log output.
const SAMPLE_LOG_LEN: usize = 500;

/// The kind of entity a report describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    Boundary,
    TimeSeries,
    GridCell,
}

/// Outcome of validating one source collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub entity: EntityKind,
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    /// The first rejected document, as received.
    pub first_invalid: Option<Value>,
}

impl ValidationReport {
    #[must_use]
    pub const fn new(entity: EntityKind) -> Self {
        Self {
            entity,
            total: 0,
            valid: 0,
            invalid: 0,
            first_invalid: None,
        }
    }

    const fn accept(&mut self) {
        self.total += 1;
        self.valid += 1;
    }

    fn reject(&mut self, doc: &Value) {
        self.total += 1;
        self.invalid += 1;
        if self.first_invalid.is_none() {
            self.first_invalid = Some(doc.clone());
        }
    }

    /// Logs the summary, plus a sample of the first invalid record.
    pub fn log(&self) {
        log::info!(
            "{}: {} valid, {} invalid of {} records",
            self.entity,
            self.valid,
            self.invalid,
            self.total
        );
        if let Some(sample) = &self.first_invalid {
            log::warn!(
                "{}: first invalid record: {}",
                self.entity,
                truncate_for_log(&sample.to_string(), SAMPLE_LOG_LEN)
            );
        }
    }
}

/// Truncates a string for logging, appending "..." if it exceeds `max_len`
/// characters.
fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len).collect();
        format!("{head}...")
    }
}

/// A validated boundary feature with its normalized identity.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    pub identity: AdminIdentity,
    pub geometry: geojson::Geometry,
}

/// Splits a raw boundary document into its properties bag and geometry.
///
/// `GeoJSON` features carry identity under `properties`; flat documents
/// carry it at the top level next to `geometry`.
fn boundary_parts(doc: &Value) -> Option<(&JsonObject, Option<&Value>)> {
    let obj = doc.as_object()?;
    let props = match obj.get("properties") {
        Some(Value::Object(props)) => props,
        _ => obj,
    };
    Some((props, obj.get("geometry")))
}

/// Whether a geometry has a recognized type and a non-empty coordinate
/// structure.
#[must_use]
pub fn parse_geometry(value: &Value) -> Option<geojson::Geometry> {
    let geometry: geojson::Geometry = serde_json::from_value(value.clone()).ok()?;
    let has_coordinates = match &geometry.value {
        geojson::Value::Point(position) => !position.is_empty(),
        geojson::Value::MultiPoint(positions) | geojson::Value::LineString(positions) => {
            !positions.is_empty()
        }
        geojson::Value::MultiLineString(lines) | geojson::Value::Polygon(lines) => {
            lines.iter().any(|line| !line.is_empty())
        }
        geojson::Value::MultiPolygon(polygons) => polygons
            .iter()
            .any(|rings| rings.iter().any(|ring| !ring.is_empty())),
        geojson::Value::GeometryCollection(_) => false,
    };
    has_coordinates.then_some(geometry)
}

/// Whether a normalized boundary properties bag and geometry form a valid
/// administrative unit.
#[must_use]
pub fn is_valid_boundary_feature(properties: &JsonObject, geometry: Option<&Value>) -> bool {
    identity_of(properties).is_some() && geometry.and_then(parse_geometry).is_some()
}

/// Whether a normalized time-series record has its identity and a date.
#[must_use]
pub fn is_valid_time_series_record(record: &JsonObject) -> bool {
    identity_of(record).is_some() && record.get(DATE_FIELD).and_then(normalize_date).is_some()
}

/// Whether a raw grid document has a finite numeric position.
#[must_use]
pub fn is_valid_grid_cell(doc: &Value) -> bool {
    GridCell::from_raw(doc).is_some()
}

fn boundary_feature(doc: &Value) -> Option<BoundaryFeature> {
    let (props, geometry) = boundary_parts(doc)?;
    let props = normalize_identity_fields(props);
    if !is_valid_boundary_feature(&props, geometry) {
        return None;
    }
    Some(BoundaryFeature {
        identity: identity_of(&props)?,
        geometry: parse_geometry(geometry?)?,
    })
}

fn time_series_record(doc: &Value) -> Option<TimeSeriesRecord> {
    let record = normalize_identity_fields(doc.as_object()?);
    if !is_valid_time_series_record(&record) {
        return None;
    }
    Some(TimeSeriesRecord {
        identity: identity_of(&record)?,
        date: record.get(DATE_FIELD).and_then(normalize_date)?,
        metrics: metrics_of(&record),
    })
}

/// Normalizes and validates raw boundary documents.
#[must_use]
pub fn prepare_boundaries(raw: &[Value]) -> (Vec<BoundaryFeature>, ValidationReport) {
    let mut report = ValidationReport::new(EntityKind::Boundary);
    let mut features = Vec::with_capacity(raw.len());

    for doc in raw {
        match boundary_feature(doc) {
            Some(feature) => {
                report.accept();
                features.push(feature);
            }
            None => report.reject(doc),
        }
    }

    (features, report)
}

/// Normalizes and validates raw time-series documents.
#[must_use]
pub fn prepare_time_series(raw: &[Value]) -> (Vec<TimeSeriesRecord>, ValidationReport) {
    let mut report = ValidationReport::new(EntityKind::TimeSeries);
    let mut records = Vec::with_capacity(raw.len());

    for doc in raw {
        match time_series_record(doc) {
            Some(record) => {
                report.accept();
                records.push(record);
            }
            None => report.reject(doc),
        }
    }

    (records, report)
}

/// Filters raw grid documents, keeping valid ones unmodified.
#[must_use]
pub fn prepare_grids(raw: &[Value]) -> (Vec<Value>, ValidationReport) {
    let mut report = ValidationReport::new(EntityKind::GridCell);
    let mut grids = Vec::with_capacity(raw.len());

    for doc in raw {
        if is_valid_grid_cell(doc) {
            report.accept();
            grids.push(doc.clone());
        } else {
            report.reject(doc);
        }
    }

    (grids, report)
}
