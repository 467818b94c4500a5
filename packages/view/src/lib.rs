#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Presentation data derived from the persisted map artifacts.
//!
//! Everything here is a pure function of an already-loaded artifact and
//! the user's current selection, cheap enough to re-run on every input
//! change:
//!
//! - [`grid`]: grid-cell filtering by average-time bands
//! - [`classify`]: equal-interval breaks for choropleth coloring

pub mod classify;
pub mod grid;

pub use classify::{class_counts, classify, compute_breaks};
pub use grid::{GridCache, GridSummary, TIME_BANDS, TimeBand, TimeRange, filter_by_ranges};
