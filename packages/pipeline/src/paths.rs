//! Canonical locations for generated artifacts.

use std::path::{Path, PathBuf};

/// Environment variable overriding the artifact directory.
pub const ENV_OUTPUT_DIR: &str = "WIO_MAP_OUTPUT_DIR";

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`.
///
/// # Panics
///
/// Panics if the project root cannot be resolved.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .expect("Failed to find project root from CARGO_MANIFEST_DIR")
        .to_path_buf()
}

/// Returns the `data/generated/` directory for map artifacts.
#[must_use]
pub fn generated_dir() -> PathBuf {
    project_root().join("data").join("generated")
}

/// Returns the artifact directory, honoring [`ENV_OUTPUT_DIR`].
#[must_use]
pub fn output_dir_from_env() -> PathBuf {
    std::env::var(ENV_OUTPUT_DIR)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map_or_else(generated_dir, PathBuf::from)
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
