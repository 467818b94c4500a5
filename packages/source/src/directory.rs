//! Directory-backed document source.
//!
//! Reads `<root>/<collection>.json`, where each file is an exported
//! collection (a JSON array, a `FeatureCollection`, or a `documents`
//! envelope).

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::{DocumentSource, SourceError, extract_documents};

/// Reads collections from JSON files in a single directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Creates a source rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the file path backing `collection`.
    #[must_use]
    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.root.join(format!("{collection}.json"))
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl DocumentSource for DirectorySource {
    fn describe(&self) -> String {
        format!("directory {}", self.root.display())
    }

    async fn fetch_collection(
        &self,
        collection: &str,
    ) -> Result<Vec<serde_json::Value>, SourceError> {
        let path = self.collection_path(collection);
        log::debug!("Reading {}", path.display());

        let body = tokio::fs::read_to_string(&path).await?;
        let json: serde_json::Value = serde_json::from_str(&body)?;
        let docs = extract_documents(json, &path.display().to_string())?;

        log::info!("{collection}: read {} documents", docs.len());
        Ok(docs)
    }
}
