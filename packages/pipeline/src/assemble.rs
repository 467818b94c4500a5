//! Joins boundary features with indexed time series.
//!
//! Produces the two persisted artifacts: a `GeoJSON` `FeatureCollection`
//! whose properties carry each unit's latest metrics and full history,
//! and a key-indexed map of chronological metric histories.
//!
//! The two differ in how missing metrics are represented. Latest values
//! embedded in feature properties default to `0`; the stored histories
//! keep `null` wherever the source had no observation.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::{Map, Value};
use wio_map_region_models::{Metric, MetricValues, TimeSeriesRecord, UnitSeries};

use crate::index::SeriesIndex;
use crate::normalize::{COUNTRY_FIELD, LEVEL1_FIELD, LEVEL2_FIELD};
use crate::validate::{BoundaryFeature, ValidationReport, prepare_boundaries, prepare_time_series};

/// Property holding a unit's embedded history.
pub const TIME_SERIES_PROPERTY: &str = "time_series";

/// Key-indexed chronological histories, as stored in `time_series.json`.
pub type SeriesByKey = BTreeMap<String, UnitSeries>;

/// How boundaries and time series matched up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JoinSummary {
    /// Boundary features emitted.
    pub units: usize,
    /// Features that found a time series.
    pub units_with_series: usize,
    /// Features that found none and were defaulted.
    pub units_without_series: usize,
    /// Series keys that matched no boundary feature.
    pub unmatched_series: usize,
}

/// Output of the join.
#[derive(Debug, Clone)]
pub struct Assembled {
    pub feature_collection: geojson::FeatureCollection,
    pub series_by_key: SeriesByKey,
    pub boundary_report: ValidationReport,
    pub time_series_report: ValidationReport,
    pub join: JoinSummary,
    /// Most recent latest-meaningful date across every series.
    pub latest_sync: Option<String>,
}

/// Normalizes, validates, indexes, and joins raw boundary and time-series
/// documents.
///
/// Empty or fully invalid inputs produce an empty collection and map.
#[must_use]
pub fn assemble(boundaries: &[Value], time_series: &[Value]) -> Assembled {
    let (features, boundary_report) = prepare_boundaries(boundaries);
    let (records, time_series_report) = prepare_time_series(time_series);
    boundary_report.log();
    time_series_report.log();

    let index = SeriesIndex::build(records);
    let (feature_collection, join) = join_features(&features, &index);
    let series_by_key = series_by_display_key(&index);
    let latest_sync = index.latest_sync().map(str::to_string);

    log::info!(
        "Joined {} units ({} with series, {} without); {} series matched no boundary",
        join.units,
        join.units_with_series,
        join.units_without_series,
        join.unmatched_series
    );

    Assembled {
        feature_collection,
        series_by_key,
        boundary_report,
        time_series_report,
        join,
        latest_sync,
    }
}

/// Attaches latest metrics and history to each boundary feature.
///
/// Feature order follows `features`.
#[must_use]
pub fn join_features(
    features: &[BoundaryFeature],
    index: &SeriesIndex,
) -> (geojson::FeatureCollection, JoinSummary) {
    let mut summary = JoinSummary::default();
    let mut matched_keys = BTreeSet::new();
    let mut out = Vec::with_capacity(features.len());

    for feature in features {
        let key = feature.identity.canonical_key();
        let series = index.get(&key);

        if series.is_empty() {
            summary.units_without_series += 1;
        } else {
            summary.units_with_series += 1;
            matched_keys.insert(key.clone());
        }

        let latest = index.latest(&key).map(|r| r.metrics).unwrap_or_default();
        let history: Vec<Value> = series
            .iter()
            .map(TimeSeriesRecord::to_point)
            .map(|point| serde_json::to_value(point).unwrap_or(Value::Null))
            .collect();

        let identity = &feature.identity;
        let mut properties = Map::new();
        for (field, value) in [
            (COUNTRY_FIELD, &identity.country),
            (LEVEL1_FIELD, &identity.level1_name),
            (LEVEL2_FIELD, &identity.level2_name),
        ] {
            properties.insert(field.to_string(), Value::String(value.clone()));
        }
        properties.insert(TIME_SERIES_PROPERTY.to_string(), Value::Array(history));
        insert_latest_metrics(&mut properties, &latest);

        out.push(geojson::Feature {
            bbox: None,
            geometry: Some(feature.geometry.clone()),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        });
    }

    summary.units = out.len();
    summary.unmatched_series = index
        .iter()
        .filter(|(key, _)| !matched_keys.contains(key.as_str()))
        .count();

    let collection = geojson::FeatureCollection {
        bbox: None,
        features: out,
        foreign_members: None,
    };

    (collection, summary)
}

/// Writes one property per metric, defaulting unobserved values to `0`.
fn insert_latest_metrics(properties: &mut Map<String, Value>, latest: &MetricValues) {
    for metric in Metric::ALL {
        properties.insert(metric.to_string(), Value::from(latest.get_or_zero(metric)));
    }
}

/// Re-keys indexed groups by the unaliased display identity.
///
/// Each group is stored under the display key of its chronologically
/// first record, with metric nulls preserved.
#[must_use]
pub fn series_by_display_key(index: &SeriesIndex) -> SeriesByKey {
    index
        .iter()
        .filter_map(|(_, records)| {
            let first = records.first()?;
            Some((
                first.identity.display_key(),
                UnitSeries {
                    identity: first.identity.clone(),
                    data: records.iter().map(TimeSeriesRecord::to_point).collect(),
                },
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn polygon() -> Value {
        json!({
            "type": "Polygon",
            "coordinates": [[[39.5, -4.5], [39.7, -4.5], [39.7, -4.3], [39.5, -4.5]]]
        })
    }

    fn boundary(country: &str, level1: &str, level2: &str) -> Value {
        json!({
            "type": "Feature",
            "geometry": polygon(),
            "properties": {"country": country, "level1_name": level1, "level2_name": level2}
        })
    }

    fn row(country: &str, level1: &str, level2: &str, date: &str, cpue: Option<f64>) -> Value {
        json!({
            "country": country,
            "level1_name": level1,
            "level2_name": level2,
            "date": date,
            "mean_cpue": cpue,
            "mean_cpua": null,
            "mean_rpue": 120.5,
            "mean_rpua": null,
            "mean_price_kg": null
        })
    }

    fn props(assembled: &Assembled, i: usize) -> &Map<String, Value> {
        assembled.feature_collection.features[i]
            .properties
            .as_ref()
            .unwrap()
    }

    #[test]
    fn attaches_latest_meaningful_metrics() {
        let assembled = assemble(
            &[boundary("kenya", "Kwale", "Msambweni")],
            &[
                row("kenya", "Kwale", "Msambweni", "2024-01-01", Some(1.0)),
                row("kenya", "Kwale", "Msambweni", "2024-02-01", Some(2.0)),
                json!({
                    "country": "kenya",
                    "level1_name": "Kwale",
                    "level2_name": "Msambweni",
                    "date": "2024-03-01"
                }),
            ],
        );

        let p = props(&assembled, 0);
        assert_eq!(p["mean_cpue"], json!(2.0));
        assert_eq!(p["mean_rpue"], json!(120.5));
        assert_eq!(p[TIME_SERIES_PROPERTY].as_array().unwrap().len(), 3);
        assert_eq!(assembled.join.units_with_series, 1);
    }

    #[test]
    fn defaults_missing_metrics_to_zero_but_keeps_nulls_in_store() {
        let assembled = assemble(
            &[boundary("kenya", "Kwale", "Msambweni")],
            &[row("kenya", "Kwale", "Msambweni", "2024-01-01", None)],
        );

        let p = props(&assembled, 0);
        for metric in Metric::ALL {
            let value = &p[metric.as_ref()];
            assert!(value.is_number(), "{metric} not numeric: {value}");
        }
        assert_eq!(p["mean_cpue"], json!(0.0));

        let stored = &assembled.series_by_key["kenya_Kwale_Msambweni"];
        assert_eq!(stored.data[0].metrics.mean_cpue, None);
        assert_eq!(stored.data[0].metrics.mean_rpue, Some(120.5));
    }

    #[test]
    fn unmatched_boundary_gets_empty_series() {
        let assembled = assemble(&[boundary("kenya", "Kilifi", "Malindi")], &[]);

        let p = props(&assembled, 0);
        assert_eq!(p[TIME_SERIES_PROPERTY], json!([]));
        assert_eq!(p["mean_price_kg"], json!(0.0));
        assert_eq!(assembled.join.units_without_series, 1);
        assert!(assembled.series_by_key.is_empty());
    }

    #[test]
    fn counts_series_without_boundary() {
        let assembled = assemble(
            &[],
            &[row("kenya", "Kilifi", "Malindi", "2024-01-01", Some(3.0))],
        );
        assert!(assembled.feature_collection.features.is_empty());
        assert_eq!(assembled.join.unmatched_series, 1);
        let stored = &assembled.series_by_key;
        assert!(stored.contains_key("kenya_Kilifi_Malindi"));
    }

    #[test]
    fn alias_joins_but_display_fields_stay_unaliased() {
        let assembled = assemble(
            &[boundary("Zanzibar", "Unguja", "Mjini")],
            &[row("tanzania", "Unguja", "Mjini", "2024-01-01", Some(4.0))],
        );

        let p = props(&assembled, 0);
        assert_eq!(p["country"], "Zanzibar");
        assert_eq!(p["mean_cpue"], json!(4.0));

        let stored = &assembled.series_by_key["tanzania_Unguja_Mjini"];
        assert_eq!(stored.identity.country, "tanzania");
        let keys = &assembled.series_by_key;
        assert!(!keys.contains_key("zanzibar_Unguja_Mjini"));
    }

    #[test]
    fn stored_series_keeps_source_country_spelling() {
        let assembled = assemble(
            &[boundary("tanzania", "Unguja", "Mjini")],
            &[row("Zanzibar", "Unguja", "Mjini", "2024-01-01", Some(4.0))],
        );

        let stored = &assembled.series_by_key["zanzibar_Unguja_Mjini"];
        assert_eq!(stored.identity.country, "Zanzibar");
        assert_eq!(props(&assembled, 0)["mean_cpue"], json!(4.0));
    }

    #[test]
    fn invalid_boundary_is_excluded_everywhere() {
        let assembled = assemble(
            &[
                json!({
                    "type": "Feature",
                    "geometry": polygon(),
                    "properties": {"country": "kenya", "level1_name": "Kwale"}
                }),
                boundary("kenya", "Kwale", "Msambweni"),
            ],
            &[row("kenya", "Kwale", "Msambweni", "2024-01-01", Some(1.0))],
        );

        assert_eq!(assembled.feature_collection.features.len(), 1);
        assert_eq!(assembled.boundary_report.invalid, 1);
        assert_eq!(props(&assembled, 0)["level2_name"], "Msambweni");
        assert_eq!(assembled.series_by_key.len(), 1);
    }

    #[test]
    fn latest_values_match_stored_history() {
        let assembled = assemble(
            &[boundary("kenya", "Kwale", "Msambweni")],
            &[
                row("kenya", "Kwale", "Msambweni", "2024-02-01", Some(6.0)),
                row("kenya", "Kwale", "Msambweni", "2024-01-01", Some(5.0)),
            ],
        );

        let stored = &assembled.series_by_key["kenya_Kwale_Msambweni"];
        let last = stored.data.last().unwrap();
        assert_eq!(last.date, "2024-02-01");
        let latest_cpue = last.metrics.mean_cpue.unwrap();
        assert_eq!(props(&assembled, 0)["mean_cpue"], json!(latest_cpue));
    }

    #[test]
    fn empty_inputs_produce_empty_outputs() {
        let assembled = assemble(&[], &[]);
        assert!(assembled.feature_collection.features.is_empty());
        assert!(assembled.series_by_key.is_empty());
        assert_eq!(assembled.join, JoinSummary::default());
        assert_eq!(assembled.latest_sync, None);
    }

    #[test]
    fn assembly_is_deterministic() {
        let boundaries = [
            boundary("kenya", "Kwale", "Msambweni"),
            boundary("Zanzibar", "Unguja", "Mjini"),
        ];
        let rows = [
            row("kenya", "Kwale", "Msambweni", "2024-01-01", Some(1.0)),
            row("tanzania", "Unguja", "Mjini", "2024-01-01", Some(2.0)),
        ];

        let a = assemble(&boundaries, &rows);
        let b = assemble(&boundaries, &rows);
        assert_eq!(
            serde_json::to_string(&a.feature_collection).unwrap(),
            serde_json::to_string(&b.feature_collection).unwrap()
        );
        assert_eq!(
            serde_json::to_string(&a.series_by_key).unwrap(),
            serde_json::to_string(&b.series_by_key).unwrap()
        );
    }

    #[test]
    fn mixed_spelling_group_is_stored_under_earliest_spelling() {
        let assembled = assemble(
            &[boundary("tanzania", "Unguja", "Mjini")],
            &[
                row("tanzania", "Unguja", "Mjini", "2024-03-01", Some(3.0)),
                row("Zanzibar", "Unguja", "Mjini", "2024-01-01", Some(1.0)),
                row("tanzania", "Unguja", "Mjini", "2024-02-01", Some(2.0)),
            ],
        );

        assert_eq!(assembled.series_by_key.len(), 1);
        let stored = &assembled.series_by_key["zanzibar_Unguja_Mjini"];
        assert_eq!(stored.identity.country, "Zanzibar");
        let dates: Vec<&str> = stored.data.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, ["2024-01-01", "2024-02-01", "2024-03-01"]);

        let p = props(&assembled, 0);
        assert_eq!(p["country"], "tanzania");
        assert_eq!(p["mean_cpue"], json!(3.0));
    }

    #[test]
    fn latest_sync_is_newest_meaningful_date() {
        let assembled = assemble(
            &[],
            &[
                row("kenya", "Kwale", "Msambweni", "2024-02-01", Some(1.0)),
                json!({
                    "country": "kenya",
                    "level1_name": "Kwale",
                    "level2_name": "Msambweni",
                    "date": "2024-05-01"
                }),
                row("kenya", "Kilifi", "Malindi", "2024-03-01", Some(2.0)),
            ],
        );
        assert_eq!(assembled.latest_sync.as_deref(), Some("2024-03-01"));
    }
}
