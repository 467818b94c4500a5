//! Grid-cell effort filtering.
//!
//! The grid dataset is loaded once into a [`GridCache`] and then
//! re-filtered by average-time bands whenever the selection changes.

use serde::Serialize;
use serde_json::Value;
use wio_map_region_models::GridCell;

/// Half-open interval `[min, max)` over average hours spent in a cell.
/// `max: None` is unbounded above.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeRange {
    pub min: f64,
    pub max: Option<f64>,
}

impl TimeRange {
    #[must_use]
    pub const fn new(min: f64, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// Whether `hours` falls inside this range.
    #[must_use]
    pub fn contains(&self, hours: f64) -> bool {
        hours >= self.min && self.max.is_none_or(|max| hours < max)
    }
}

/// A labelled preset range offered in the band selector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeBand {
    pub label: &'static str,
    pub range: TimeRange,
}

/// Default band presets, contiguous and ascending. The last is open-ended.
pub const TIME_BANDS: [TimeBand; 5] = [
    TimeBand {
        label: "< 1 h",
        range: TimeRange::new(0.0, Some(1.0)),
    },
    TimeBand {
        label: "1-2 h",
        range: TimeRange::new(1.0, Some(2.0)),
    },
    TimeBand {
        label: "2-4 h",
        range: TimeRange::new(2.0, Some(4.0)),
    },
    TimeBand {
        label: "4-8 h",
        range: TimeRange::new(4.0, Some(8.0)),
    },
    TimeBand {
        label: ">= 8 h",
        range: TimeRange::new(8.0, None),
    },
];

/// Looks up a preset band by its label.
#[must_use]
pub fn band_by_label(label: &str) -> Option<&'static TimeBand> {
    TIME_BANDS.iter().find(|band| band.label == label.trim())
}

/// Ranges of every preset band, the selection used before the user
/// narrows it.
#[must_use]
pub fn default_ranges() -> Vec<TimeRange> {
    TIME_BANDS.iter().map(|band| band.range).collect()
}

/// Grid cells loaded from `pds_grids.json`. Empty until loaded and
/// read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridCache {
    cells: Vec<GridCell>,
}

impl GridCache {
    /// Converts raw grid documents into cells, dropping any without a
    /// finite position.
    #[must_use]
    pub fn load(records: &[Value]) -> Self {
        let cells: Vec<GridCell> = records.iter().filter_map(GridCell::from_raw).collect();

        let dropped = records.len() - cells.len();
        if dropped > 0 {
            log::warn!("Dropped {dropped} grid records without a finite position");
        }
        log::debug!("Loaded {} grid cells", cells.len());

        Self { cells }
    }

    #[must_use]
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Returns the cells whose average time falls in any of `ranges`, in
/// cache order. Overlapping ranges never duplicate a cell.
#[must_use]
pub fn filter_by_ranges(cache: &GridCache, ranges: &[TimeRange]) -> Vec<GridCell> {
    cache
        .cells
        .iter()
        .filter(|cell| in_any(ranges, cell.avg_time_hours))
        .copied()
        .collect()
}

fn in_any(ranges: &[TimeRange], hours: f64) -> bool {
    ranges.iter().any(|range| range.contains(hours))
}

/// Headline numbers for a filtered selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridSummary {
    pub cells: usize,
    pub total_visits: f64,
    /// Mean of the cells' average hours; `0.0` for an empty selection.
    pub mean_avg_time_hours: f64,
}

impl GridSummary {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn of(cells: &[GridCell]) -> Self {
        let total_visits = cells.iter().map(|cell| cell.total_visits).sum();
        let mean_avg_time_hours = if cells.is_empty() {
            0.0
        } else {
            cells.iter().map(|cell| cell.avg_time_hours).sum::<f64>() / cells.len() as f64
        };

        Self {
            cells: cells.len(),
            total_visits,
            mean_avg_time_hours,
        }
    }
}

/// Heatmap points as `[lng, lat, weight]`, weighted by total visits.
#[must_use]
pub fn heatmap_points(cells: &[GridCell]) -> Vec<[f64; 3]> {
    cells
        .iter()
        .map(|cell| [cell.lng, cell.lat, cell.total_visits])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cache_with_hours(hours: &[f64]) -> GridCache {
        let records: Vec<Value> = hours
            .iter()
            .enumerate()
            .map(|(i, h)| {
                json!({
                    "lat_grid_1km": -4.0 - f64::from(u8::try_from(i).unwrap()) * 0.01,
                    "lng_grid_1km": 39.5,
                    "avg_time_hours": h,
                    "total_visits": 10
                })
            })
            .collect();
        GridCache::load(&records)
    }

    fn hours_of(cells: &[GridCell]) -> Vec<f64> {
        cells.iter().map(|cell| cell.avg_time_hours).collect()
    }

    #[test]
    fn empty_cache_before_load() {
        let cache = GridCache::default();
        assert!(cache.is_empty());
        assert!(filter_by_ranges(&cache, &default_ranges()).is_empty());
    }

    #[test]
    fn load_drops_invalid_positions() {
        let cache = GridCache::load(&[
            json!({"lat_grid_1km": -4.0, "lng_grid_1km": 39.5}),
            json!({"lat_grid_1km": null, "lng_grid_1km": 39.5}),
            json!({"lat": "x", "lng": 39.5}),
            json!({"lat": -5.0, "lng": 40.0, "avgTimeHours": 2.0}),
        ]);
        assert_eq!(cache.len(), 2);
        let hours = cache.cells()[1].avg_time_hours;
        assert!((hours - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn range_max_is_exclusive_and_min_inclusive() {
        let cache = cache_with_hours(&[0.5, 1.0, 1.5, 2.0]);

        let first = filter_by_ranges(&cache, &[TIME_BANDS[0].range]);
        assert_eq!(hours_of(&first), [0.5]);

        let second = filter_by_ranges(&cache, &[TIME_BANDS[1].range]);
        assert_eq!(hours_of(&second), [1.0, 1.5]);

        let third = filter_by_ranges(&cache, &[TIME_BANDS[2].range]);
        assert_eq!(hours_of(&third), [2.0]);
    }

    #[test]
    fn last_band_is_unbounded() {
        let cache = cache_with_hours(&[7.99, 8.0, 240.0]);
        let long = filter_by_ranges(&cache, &[TIME_BANDS[4].range]);
        assert_eq!(hours_of(&long), [8.0, 240.0]);
    }

    #[test]
    fn union_keeps_cache_order() {
        let cache = cache_with_hours(&[5.0, 0.5, 3.0, 1.5]);
        let ranges = [TIME_BANDS[3].range, TIME_BANDS[0].range];
        assert_eq!(hours_of(&filter_by_ranges(&cache, &ranges)), [5.0, 0.5]);

        let reversed = [TIME_BANDS[0].range, TIME_BANDS[3].range];
        assert_eq!(
            filter_by_ranges(&cache, &ranges),
            filter_by_ranges(&cache, &reversed)
        );
    }

    #[test]
    fn overlapping_ranges_do_not_duplicate() {
        let cache = cache_with_hours(&[1.5]);
        let ranges = [TimeRange::new(0.0, Some(2.0)), TimeRange::new(1.0, None)];
        assert_eq!(filter_by_ranges(&cache, &ranges).len(), 1);
    }

    #[test]
    fn default_bands_cover_every_cell() {
        let cache = cache_with_hours(&[0.0, 0.99, 3.0, 8.0, 100.0]);
        let selected = filter_by_ranges(&cache, &default_ranges());
        assert_eq!(selected.len(), cache.len());
    }

    #[test]
    fn band_lookup_by_label() {
        assert_eq!(
            band_by_label("2-4 h").unwrap().range,
            TimeRange::new(2.0, Some(4.0))
        );
        assert_eq!(band_by_label(" >= 8 h ").unwrap().range.max, None);
        assert!(band_by_label("8-16 h").is_none());
    }

    #[test]
    fn summary_and_heatmap() {
        let cache = cache_with_hours(&[1.0, 3.0]);
        let summary = GridSummary::of(cache.cells());
        assert_eq!(summary.cells, 2);
        assert!((summary.total_visits - 20.0).abs() < f64::EPSILON);
        assert!((summary.mean_avg_time_hours - 2.0).abs() < f64::EPSILON);

        let points = heatmap_points(cache.cells());
        assert_eq!(points[0], [39.5, -4.0, 10.0]);

        let empty = GridSummary::of(&[]);
        assert_eq!(empty.cells, 0);
        assert!(empty.mean_avg_time_hours.abs() < f64::EPSILON);
    }
}
