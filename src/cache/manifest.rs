//! Container image manifest
//!
//! A static JSON document mapping logical image names to remote URIs,
//! shipped with the pipeline base. Consumed read-only; entry order is
//! the document's insertion order and drives pull order.

use crate::error::{ExoflowError, ExoflowResult};
use serde::Deserialize;
use serde_json::Map;
use std::path::Path;
use tokio::fs;

/// Manifest of remote container images, keyed by logical name.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceManifest {
    /// Logical image name -> source URI. serde_json's preserve_order
    /// feature keeps iteration in document order.
    pub images: Map<String, serde_json::Value>,
}

impl ResourceManifest {
    /// Load a manifest from a JSON file.
    ///
    /// Unreadable or malformed documents are fatal; no partial
    /// reconciliation is ever attempted against a bad manifest.
    pub async fn load(path: &Path) -> ExoflowResult<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| ExoflowError::ManifestInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let manifest: ResourceManifest =
            serde_json::from_str(&content).map_err(|e| ExoflowError::ManifestInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        // Every entry must be a URI string; a partially usable manifest
        // would silently skip images during reconciliation.
        for (name, uri) in &manifest.images {
            if !uri.is_string() {
                return Err(ExoflowError::ManifestInvalid {
                    path: path.to_path_buf(),
                    reason: format!("image '{}' must map to a URI string", name),
                });
            }
        }

        Ok(manifest)
    }

    /// Iterate (name, uri) pairs in document order. `load` guarantees
    /// every value is a string.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.images
            .iter()
            .filter_map(|(name, uri)| uri.as_str().map(|u| (name.as_str(), u)))
    }
}
