#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Administrative region and fisheries metric types.
//!
//! Regions follow a GAUL-style hierarchy: a country plus two nested
//! subdivision names. Survey metrics are attached to regions over time,
//! while GPS grid aggregates are independent point data used for the
//! fishing-effort heatmap.

pub mod countries;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A survey metric reported per administrative unit and date.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Metric {
    /// Catch per unit effort (kg per fisher per day).
    MeanCpue,
    /// Catch per unit area.
    MeanCpua,
    /// Revenue per unit effort.
    MeanRpue,
    /// Revenue per unit area.
    MeanRpua,
    /// Average price per kilogram.
    MeanPriceKg,
}

impl Metric {
    /// All metrics in display order.
    pub const ALL: [Self; 5] = [
        Self::MeanCpue,
        Self::MeanCpua,
        Self::MeanRpue,
        Self::MeanRpua,
        Self::MeanPriceKg,
    ];
}

/// The fixed set of survey metrics, each independently nullable.
///
/// `None` means "no observation", which is distinct from an observed
/// zero. Serializes with explicit `null`s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricValues {
    pub mean_cpue: Option<f64>,
    pub mean_cpua: Option<f64>,
    pub mean_rpue: Option<f64>,
    pub mean_rpua: Option<f64>,
    pub mean_price_kg: Option<f64>,
}

impl MetricValues {
    /// Returns the value of a single metric.
    #[must_use]
    pub const fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::MeanCpue => self.mean_cpue,
            Metric::MeanCpua => self.mean_cpua,
            Metric::MeanRpue => self.mean_rpue,
            Metric::MeanRpua => self.mean_rpua,
            Metric::MeanPriceKg => self.mean_price_kg,
        }
    }

    /// Sets the value of a single metric.
    pub const fn set(&mut self, metric: Metric, value: Option<f64>) {
        match metric {
            Metric::MeanCpue => self.mean_cpue = value,
            Metric::MeanCpua => self.mean_cpua = value,
            Metric::MeanRpue => self.mean_rpue = value,
            Metric::MeanRpua => self.mean_rpua = value,
            Metric::MeanPriceKg => self.mean_price_kg = value,
        }
    }

    /// Whether at least one metric carries an observed value.
    #[must_use]
    pub fn has_any(&self) -> bool {
        Metric::ALL.iter().any(|m| self.get(*m).is_some())
    }

    /// Returns the value of a metric, or `0.0` when it was not observed.
    #[must_use]
    pub fn get_or_zero(&self, metric: Metric) -> f64 {
        self.get(metric).unwrap_or(0.0)
    }
}

/// The three-part identity of an administrative unit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AdminIdentity {
    /// Country name as it appears in the source (not aliased).
    pub country: String,
    /// First-level subdivision (region/province).
    pub level1_name: String,
    /// Second-level subdivision (district).
    pub level2_name: String,
}

impl AdminIdentity {
    /// Canonical join key for this unit, with country aliasing applied.
    #[must_use]
    pub fn canonical_key(&self) -> String {
        countries::canonical_key(&self.country, &self.level1_name, &self.level2_name)
    }

    /// Storage key for this unit, built from the unaliased display fields.
    #[must_use]
    pub fn display_key(&self) -> String {
        countries::display_key(&self.country, &self.level1_name, &self.level2_name)
    }
}

/// A validated, normalized time-series observation for one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesRecord {
    #[serde(flatten)]
    pub identity: AdminIdentity,
    /// Observation date as supplied by the source.
    pub date: String,
    #[serde(flatten)]
    pub metrics: MetricValues,
}

impl TimeSeriesRecord {
    /// Drops the identity, keeping only the date and metric values.
    #[must_use]
    pub fn to_point(&self) -> SeriesPoint {
        SeriesPoint {
            date: self.date.clone(),
            metrics: self.metrics,
        }
    }
}

/// One dated entry of a unit's metric history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: String,
    #[serde(flatten)]
    pub metrics: MetricValues,
}

/// Chronological metric history for one administrative unit, as stored
/// in `time_series.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSeries {
    #[serde(flatten)]
    pub identity: AdminIdentity,
    pub data: Vec<SeriesPoint>,
}

/// A GPS-derived fishing-effort aggregate for one rounded grid position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    /// Rounded latitude of the cell.
    pub lat: f64,
    /// Rounded longitude of the cell.
    pub lng: f64,
    /// Average hours spent in the cell per visit.
    pub avg_time_hours: f64,
    /// Total number of vessel visits.
    pub total_visits: f64,
    /// Average vessel speed inside the cell.
    pub avg_speed: f64,
    /// Number of fine-grained cells merged into this one.
    pub original_cells: f64,
}

/// Raw field names accepted for each grid cell attribute, in lookup order.
const GRID_LAT_FIELDS: &[&str] = &["lat_grid_1km", "lat"];
const GRID_LNG_FIELDS: &[&str] = &["lng_grid_1km", "lng"];
const GRID_AVG_TIME_FIELDS: &[&str] = &["avg_time_hours", "avgTimeHours"];
const GRID_VISITS_FIELDS: &[&str] = &["total_visits", "totalVisits"];
const GRID_SPEED_FIELDS: &[&str] = &["avg_speed", "avgSpeed"];
const GRID_CELLS_FIELDS: &[&str] = &["original_cells", "originalCells"];

impl GridCell {
    /// Reads a grid cell from a raw grid document.
    ///
    /// Returns `None` unless both position components are finite JSON
    /// numbers. Each attribute takes the first accepted field name holding
    /// a finite number, so a `null` under one spelling falls through to the
    /// other. Missing or non-numeric aggregates read as `0.0`.
    #[must_use]
    pub fn from_raw(doc: &serde_json::Value) -> Option<Self> {
        let lat = finite_field(doc, GRID_LAT_FIELDS)?;
        let lng = finite_field(doc, GRID_LNG_FIELDS)?;

        Some(Self {
            lat,
            lng,
            avg_time_hours: finite_field(doc, GRID_AVG_TIME_FIELDS).unwrap_or(0.0),
            total_visits: finite_field(doc, GRID_VISITS_FIELDS).unwrap_or(0.0),
            avg_speed: finite_field(doc, GRID_SPEED_FIELDS).unwrap_or(0.0),
            original_cells: finite_field(doc, GRID_CELLS_FIELDS).unwrap_or(0.0),
        })
    }
}

fn finite_field(doc: &serde_json::Value, names: &[&str]) -> Option<f64> {
    names
        .iter()
        .filter_map(|name| doc.get(name))
        .filter_map(serde_json::Value::as_f64)
        .find(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr as _;

    #[test]
    fn metric_names_match_artifact_fields() {
        let names: Vec<String> = Metric::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(
            names,
            [
                "mean_cpue",
                "mean_cpua",
                "mean_rpue",
                "mean_rpua",
                "mean_price_kg"
            ]
        );
        assert_eq!(
            Metric::from_str("mean_price_kg").ok(),
            Some(Metric::MeanPriceKg)
        );
        assert!(Metric::from_str("mean_weight").is_err());
    }

    #[test]
    fn metric_values_serialize_nulls() {
        let values = MetricValues {
            mean_cpue: Some(2.5),
            ..MetricValues::default()
        };
        let json = serde_json::to_value(values).unwrap();
        assert_eq!(json["mean_cpue"], serde_json::json!(2.5));
        assert!(json["mean_rpua"].is_null());
        assert_eq!(json.as_object().unwrap().len(), 5);
    }

    #[test]
    fn has_any_and_zero_default() {
        let mut values = MetricValues::default();
        assert!(!values.has_any());
        assert!(values.get_or_zero(Metric::MeanCpua).abs() < f64::EPSILON);

        values.set(Metric::MeanRpue, Some(7.0));
        assert!(values.has_any());
        assert_eq!(values.get(Metric::MeanRpue), Some(7.0));
    }

    #[test]
    fn unit_series_flattens_identity() {
        let series = UnitSeries {
            identity: AdminIdentity {
                country: "kenya".to_string(),
                level1_name: "Kwale".to_string(),
                level2_name: "Msambweni".to_string(),
            },
            data: vec![SeriesPoint {
                date: "2024-01-01".to_string(),
                metrics: MetricValues::default(),
            }],
        };
        let json = serde_json::to_value(&series).unwrap();
        assert_eq!(json["country"], "kenya");
        assert_eq!(json["level2_name"], "Msambweni");
        assert_eq!(json["data"][0]["date"], "2024-01-01");
        assert!(json["data"][0]["mean_cpue"].is_null());
    }

    #[test]
    fn grid_cell_from_raw() {
        let cell = GridCell::from_raw(&serde_json::json!({
            "lat_grid_1km": -4.05,
            "lng_grid_1km": 39.67,
            "avg_time_hours": 2.5,
            "total_visits": 14,
            "avg_speed": 3.1,
            "original_cells": 4
        }))
        .unwrap();
        assert!((cell.lat - -4.05).abs() < f64::EPSILON);
        assert!((cell.avg_time_hours - 2.5).abs() < f64::EPSILON);
        assert!((cell.total_visits - 14.0).abs() < f64::EPSILON);
    }

    #[test]
    fn grid_cell_requires_numeric_position() {
        let text_lat = serde_json::json!({"lat": "-4.05", "lng": 39.6});
        let no_lng = serde_json::json!({"lat": -4.05});
        assert!(GridCell::from_raw(&text_lat).is_none());
        assert!(GridCell::from_raw(&no_lng).is_none());
        assert!(GridCell::from_raw(&serde_json::Value::Null).is_none());
    }

    #[test]
    fn grid_cell_falls_through_null_spelling() {
        let doc = serde_json::json!({
            "lat_grid_1km": null,
            "lat": -4.0,
            "lng_grid_1km": "39.5",
            "lng": 39.5
        });
        let cell = GridCell::from_raw(&doc).unwrap();
        assert!((cell.lat - -4.0).abs() < f64::EPSILON);
        assert!((cell.lng - 39.5).abs() < f64::EPSILON);
    }

    #[test]
    fn grid_cell_defaults_missing_aggregates() {
        let doc = serde_json::json!({"lat": 1.0, "lng": 2.0});
        let cell = GridCell::from_raw(&doc).unwrap();
        assert!(cell.avg_time_hours.abs() < f64::EPSILON);
        assert!(cell.original_cells.abs() < f64::EPSILON);
    }
}
