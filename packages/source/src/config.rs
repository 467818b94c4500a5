//! Source configuration.
//!
//! A default configuration is embedded at compile time. It can be
//! replaced by a TOML file and then adjusted through environment
//! variables or command-line flags.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::directory::DirectorySource;
use crate::http::HttpSource;
use crate::{DocumentSource, SourceError};

/// Embedded default configuration.
const DEFAULT_CONFIG_TOML: &str = include_str!("../config/default.toml");

/// Environment variable selecting a directory backend.
pub const ENV_SOURCE_DIR: &str = "WIO_MAP_SOURCE_DIR";

/// Environment variable selecting an HTTP backend.
pub const ENV_SOURCE_URL: &str = "WIO_MAP_SOURCE_URL";

/// Where collections are read from and what they are called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Storage backend.
    pub backend: BackendConfig,
    /// Collection names for the three inputs.
    pub collections: CollectionNames,
}

/// Storage backend for source collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackendConfig {
    /// One `<collection>.json` file per collection.
    Directory {
        /// Directory holding the exported collection files.
        path: PathBuf,
    },
    /// `GET <base_url>/<collection>` returns the collection.
    Http {
        /// API root URL.
        base_url: String,
    },
}

/// Collection names for the boundary, time-series, and grid inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionNames {
    pub boundaries: String,
    pub time_series: String,
    pub grids: String,
}

impl SourceConfig {
    /// Returns the embedded default configuration.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML fails to parse. It is a compile-time
    /// constant, so a failure is a development error caught by tests.
    #[must_use]
    pub fn embedded_default() -> Self {
        Self::from_toml_str(DEFAULT_CONFIG_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse embedded source config: {e}"))
    }

    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Config`] if the TOML is invalid.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, SourceError> {
        Ok(toml::de::from_str(toml_str)?)
    }

    /// Loads the configuration from `path`, or the embedded default when
    /// no path is given.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, SourceError> {
        match path {
            Some(path) => {
                log::info!("Loading source config from {}", path.display());
                Self::from_toml_str(&std::fs::read_to_string(path)?)
            }
            None => Ok(Self::embedded_default()),
        }
    }

    /// Applies backend overrides. A URL takes precedence over a directory
    /// when both are given.
    #[must_use]
    pub fn with_overrides(
        mut self,
        source_dir: Option<PathBuf>,
        source_url: Option<String>,
    ) -> Self {
        if let Some(path) = source_dir {
            self.backend = BackendConfig::Directory { path };
        }
        if let Some(base_url) = source_url {
            self.backend = BackendConfig::Http { base_url };
        }
        self
    }

    /// Applies [`ENV_SOURCE_DIR`] and [`ENV_SOURCE_URL`] overrides.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        let dir = std::env::var(ENV_SOURCE_DIR)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);
        let url = std::env::var(ENV_SOURCE_URL)
            .ok()
            .filter(|s| !s.trim().is_empty());
        self.with_overrides(dir, url)
    }

    /// Builds the configured document source.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the HTTP client cannot be built.
    pub fn build_source(&self) -> Result<Box<dyn DocumentSource>, SourceError> {
        Ok(match &self.backend {
            BackendConfig::Directory { path } => Box::new(DirectorySource::new(path)),
            BackendConfig::Http { base_url } => Box::new(HttpSource::new(base_url)?),
        })
    }
}
