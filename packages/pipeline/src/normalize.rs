//! Field normalization for raw source documents.
//!
//! Boundary and time-series sources disagree on a few field names and
//! encodings. Everything is reconciled here, once, into the canonical
//! record shape; later stages only ever see the normalized form.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat};
use serde_json::{Map, Value};
use wio_map_region_models::countries::country_from_code;
use wio_map_region_models::{AdminIdentity, Metric, MetricValues};

/// A JSON object (a record or a properties bag).
pub type JsonObject = Map<String, Value>;

pub const COUNTRY_FIELD: &str = "country";
pub const COUNTRY_CODE_FIELD: &str = "country_code";
pub const LEVEL1_FIELD: &str = "level1_name";
pub const LEVEL2_FIELD: &str = "level2_name";
/// Two-part spelling of [`LEVEL2_FIELD`] used by some boundary exports.
pub const LEVEL2_ALT_FIELD: &str = "level_2_name";
pub const DATE_FIELD: &str = "date";

/// Reconciles alternate identity field names into the canonical shape.
///
/// - Copies `level_2_name` into `level2_name` when the latter is absent.
/// - Derives `country` from a three-letter `country_code` when the
///   country is absent and the code is recognized.
///
/// A field is absent when it is missing, `null`, or an empty string.
/// Applying this twice gives the same result as applying it once.
#[must_use]
pub fn normalize_identity_fields(record: &JsonObject) -> JsonObject {
    let mut out = record.clone();

    if is_absent(out.get(LEVEL2_FIELD))
        && let Some(alt) = out.get(LEVEL2_ALT_FIELD).filter(|v| !is_absent(Some(*v)))
    {
        let alt = alt.clone();
        out.insert(LEVEL2_FIELD.to_string(), alt);
    }

    if is_absent(out.get(COUNTRY_FIELD))
        && let Some(country) = out
            .get(COUNTRY_CODE_FIELD)
            .and_then(Value::as_str)
            .and_then(country_from_code)
    {
        out.insert(COUNTRY_FIELD.to_string(), Value::from(country));
    }

    out
}

const fn is_absent(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Reads a required, non-blank string field.
#[must_use]
pub fn non_empty_str<'a>(record: &'a JsonObject, field: &str) -> Option<&'a str> {
    record
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// Extracts the administrative identity from a normalized record.
///
/// Returns `None` if any of the three fields is missing or blank.
#[must_use]
pub fn identity_of(record: &JsonObject) -> Option<AdminIdentity> {
    Some(AdminIdentity {
        country: non_empty_str(record, COUNTRY_FIELD)?.to_string(),
        level1_name: non_empty_str(record, LEVEL1_FIELD)?.to_string(),
        level2_name: non_empty_str(record, LEVEL2_FIELD)?.to_string(),
    })
}

/// Normalizes a date value into a string.
///
/// Strings are kept verbatim. Extended-JSON dates (`{"$date": ...}`) are
/// unwrapped, and epoch milliseconds render as RFC 3339 UTC. Blank
/// strings and anything else yield `None`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn normalize_date(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .and_then(millis_to_rfc3339),
        Value::Object(obj) => match obj.get("$date")? {
            Value::Object(inner) => inner
                .get("$numberLong")
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<i64>().ok())
                .and_then(millis_to_rfc3339),
            other => normalize_date(other),
        },
        _ => None,
    }
}

fn millis_to_rfc3339(millis: i64) -> Option<String> {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Coerces a raw metric value. Only finite JSON numbers survive;
/// everything else (strings, booleans, `null`) is treated as absent.
#[must_use]
pub fn coerce_metric(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64).filter(|v| v.is_finite())
}

/// Reads the fixed metric set from a record.
#[must_use]
pub fn metrics_of(record: &JsonObject) -> MetricValues {
    let mut values = MetricValues::default();
    for metric in Metric::ALL {
        values.set(metric, coerce_metric(record.get(metric.as_ref())));
    }
    values
}

/// Sort key placing dates in chronological order.
///
/// Parseable dates order by instant; unparseable ones sort after all
/// parseable dates, lexically among themselves.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum DateKey {
    Parsed(NaiveDateTime),
    Unparsed(String),
}

impl DateKey {
    /// Builds the sort key for a normalized date string.
    #[must_use]
    pub fn parse(date: &str) -> Self {
        parse_date(date.trim())
            .map_or_else(|| Self::Unparsed(date.to_string()), Self::Parsed)
    }
}

fn parse_date(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Compares two normalized date strings chronologically.
#[must_use]
pub fn compare_dates(a: &str, b: &str) -> Ordering {
    DateKey::parse(a).cmp(&DateKey::parse(b))
}
