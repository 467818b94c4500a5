//! Time-series grouping and latest-value selection.
//!
//! Records are grouped under their canonical (alias-resolved) key and
//! kept in chronological order. The "latest" record of a group skips
//! trailing placeholder rows that carry a date but no observed metric.

use std::collections::BTreeMap;

use wio_map_region_models::TimeSeriesRecord;

use crate::normalize::DateKey;

/// Validated time-series records grouped by canonical key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesIndex {
    groups: BTreeMap<String, Vec<TimeSeriesRecord>>,
}

impl SeriesIndex {
    /// Groups `records` by canonical key, each group sorted ascending by
    /// date. Records with equal dates keep their input order.
    #[must_use]
    pub fn build(records: Vec<TimeSeriesRecord>) -> Self {
        let mut decorated: BTreeMap<String, Vec<(DateKey, TimeSeriesRecord)>> = BTreeMap::new();

        for record in records {
            let key = record.identity.canonical_key();
            let date_key = DateKey::parse(&record.date);
            decorated.entry(key).or_default().push((date_key, record));
        }

        let groups = decorated
            .into_iter()
            .map(|(key, mut entries)| {
                entries.sort_by(|a, b| a.0.cmp(&b.0));
                (key, entries.into_iter().map(|(_, record)| record).collect())
            })
            .collect();

        Self { groups }
    }

    /// Returns the chronological series for `key`, or an empty slice.
    #[must_use]
    pub fn get(&self, key: &str) -> &[TimeSeriesRecord] {
        self.groups.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether any records exist under `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.groups.contains_key(key)
    }

    /// Returns the latest-meaningful record for `key`.
    #[must_use]
    pub fn latest(&self, key: &str) -> Option<&TimeSeriesRecord> {
        latest_meaningful(self.get(key))
    }

    /// Returns the date shown as the unit's most recent sync.
    #[must_use]
    pub fn latest_date(&self, key: &str) -> Option<&str> {
        self.latest(key).map(|record| record.date.as_str())
    }

    /// Returns the newest latest-meaningful date across all groups,
    /// compared as dates rather than strings.
    #[must_use]
    pub fn latest_sync(&self) -> Option<&str> {
        self.groups
            .keys()
            .filter_map(|key| self.latest_date(key))
            .max_by_key(|date| DateKey::parse(date))
    }

    /// Iterates groups in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<TimeSeriesRecord>)> {
        self.groups.iter()
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Selects the most recent record that observed at least one metric.
///
/// `series` must be sorted ascending by date. When no record carries any
/// metric, the chronologically earliest record is returned instead so a
/// real date is still available. An empty series yields `None`.
#[must_use]
pub fn latest_meaningful(series: &[TimeSeriesRecord]) -> Option<&TimeSeriesRecord> {
    series
        .iter()
        .rev()
        .find(|record| record.metrics.has_any())
        .or_else(|| series.first())
}
