//! Western Indian Ocean country tables and canonical key construction.
//!
//! Boundary polygons and survey metrics come from different systems that
//! do not always agree on country labels. Keys are built from a
//! lowercased country with known aliases folded onto the name used by
//! the metrics source, so both sides land on the same string.

/// Delimiter between the three key components.
pub const KEY_DELIMITER: char = '_';

/// Three-letter country codes for the coastal states covered by the
/// dashboard.
pub const COUNTRY_CODES: &[&str] = &["COM", "KEN", "MDG", "MOZ", "MUS", "SOM", "SYC", "TZA"];

/// Maps a three-letter country code to the lowercase country name used
/// by the survey data.
///
/// Returns `None` for unrecognized codes. Matching is case-insensitive.
#[must_use]
pub fn country_from_code(code: &str) -> Option<&'static str> {
    match code.trim().to_ascii_uppercase().as_str() {
        "COM" => Some("comoros"),
        "KEN" => Some("kenya"),
        "MDG" => Some("madagascar"),
        "MOZ" => Some("mozambique"),
        "MUS" => Some("mauritius"),
        "SOM" => Some("somalia"),
        "SYC" => Some("seychelles"),
        "TZA" => Some("tanzania"),
        _ => None,
    }
}

/// Folds alternate country spellings onto the name used by the metrics
/// source.
///
/// Expects an already lowercased name. Unknown names are returned
/// unchanged.
#[must_use]
pub fn resolve_country_alias(country: &str) -> &str {
    match country {
        "zanzibar" | "united republic of tanzania" => "tanzania",
        "union of the comoros" => "comoros",
        _ => country,
    }
}

/// Lowercases and trims a raw country label.
#[must_use]
pub fn normalize_country(country: &str) -> String {
    country.trim().to_lowercase()
}

/// Builds the join key for an administrative unit.
///
/// The country is lowercased and alias-resolved; level names are used
/// verbatim. Component order is significant.
#[must_use]
pub fn canonical_key(country: &str, level1: &str, level2: &str) -> String {
    let country = normalize_country(country);
    join_key(resolve_country_alias(&country), level1, level2)
}

/// Builds the storage key for an administrative unit from its display
/// fields. Identical to [`canonical_key`] except that no alias is applied.
#[must_use]
pub fn display_key(country: &str, level1: &str, level2: &str) -> String {
    join_key(&normalize_country(country), level1, level2)
}

fn join_key(country: &str, level1: &str, level2: &str) -> String {
    format!("{country}{KEY_DELIMITER}{level1}{KEY_DELIMITER}{level2}")
}
