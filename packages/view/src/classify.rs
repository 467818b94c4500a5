//! Equal-interval choropleth classification.
//!
//! Breaks are ascending class lower bounds. Values below the first bound
//! fall in the first class and values at or above the last bound fall in
//! the last class.

use geojson::FeatureCollection;

/// Finite values of `metric` across every feature's properties.
#[must_use]
pub fn metric_values(feature_collection: &FeatureCollection, metric: &str) -> Vec<f64> {
    feature_collection
        .features
        .iter()
        .filter_map(|feature| feature.property(metric))
        .filter_map(serde_json::Value::as_f64)
        .filter(|value| value.is_finite())
        .collect()
}

/// Computes `num_classes` equal-interval lower bounds for `metric`.
///
/// With no finite values the breaks are `0, 1, ..., num_classes - 1`.
#[must_use]
pub fn compute_breaks(
    feature_collection: &FeatureCollection,
    metric: &str,
    num_classes: usize,
) -> Vec<f64> {
    let values = metric_values(feature_collection, metric);
    if values.is_empty() {
        log::debug!("No finite {metric} values; using default breaks");
        return default_breaks(num_classes);
    }
    equal_interval_breaks(&values, num_classes)
}

#[allow(clippy::cast_precision_loss)]
fn default_breaks(num_classes: usize) -> Vec<f64> {
    (0..num_classes).map(|i| i as f64).collect()
}

/// Equal-interval lower bounds over non-empty finite `values`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn equal_interval_breaks(values: &[f64], num_classes: usize) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let step = if num_classes > 1 {
        (max - min) / (num_classes - 1) as f64
    } else {
        0.0
    };

    (0..num_classes)
        .map(|i| step.mul_add(i as f64, min))
        .collect()
}

/// Index of the class `value` falls into.
///
/// Returns the last break not greater than `value`, clamped to the first
/// class. Empty `breaks` and non-finite values classify as `0`.
#[must_use]
pub fn classify(value: f64, breaks: &[f64]) -> usize {
    breaks
        .partition_point(|bound| *bound <= value)
        .saturating_sub(1)
}

/// Number of features in each class for `metric`. Features without a
/// finite value are not counted.
#[must_use]
pub fn class_counts(
    feature_collection: &FeatureCollection,
    metric: &str,
    breaks: &[f64],
) -> Vec<usize> {
    let mut counts = vec![0; breaks.len()];
    if counts.is_empty() {
        return counts;
    }
    for value in metric_values(feature_collection, metric) {
        counts[classify(value, breaks)] += 1;
    }
    counts
}
