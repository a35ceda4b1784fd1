//! Cache reconciliation
//!
//! Computes which manifest images are missing from the local SIF cache.
//! Read-only: the pull itself happens in a separately submitted job, so a
//! failure here leaves the cache exactly as found.

use crate::cache::manifest::ResourceManifest;
use crate::error::ExoflowResult;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// URIs whose SIF does not yet exist locally, in manifest order.
pub type PullList = Vec<String>;

/// Derive the cache filename for an image URI.
///
/// The key is the URI basename with `:` replaced by `_`, suffixed `.sif`,
/// e.g. `docker://x/y:1.0` -> `y_1.0.sif`. Distinct basenames never
/// collide because the mapping is injective outside the `:` substitution.
pub fn cache_key(uri: &str) -> String {
    let basename = uri.rsplit('/').next().unwrap_or(uri);
    format!("{}.sif", basename.replace(':', "_"))
}

/// Compare the manifest against the cache directory and return the URIs
/// that still need to be pulled.
///
/// Each miss is reported on stderr naming the resource and its source.
/// The decision is point-in-time: a later cacher job acts on it, and a
/// duplicate pull racing another invocation is harmless.
pub fn reconcile(manifest: &ResourceManifest, cache_dir: &Path) -> ExoflowResult<PullList> {
    for (key, uris) in conflicting_keys(manifest) {
        warn!("cache key '{}' is claimed by multiple images: {}", key, uris.join(", "));
        eprintln!(
            "Warning: images {} share the cache file '{}'; the last pull wins.",
            uris.join(" and "),
            key
        );
    }

    let mut pull = PullList::new();

    for (name, uri) in manifest.entries() {
        let sif = cache_dir.join(cache_key(uri));
        if sif.exists() {
            debug!("Image '{}' already cached at {}", name, sif.display());
        } else {
            eprintln!("Image '{}' will be pulled from \"{}\".", name, uri);
            pull.push(uri.to_string());
        }
    }

    Ok(pull)
}

/// Cache keys claimed by more than one manifest URI, each with the
/// colliding URIs in manifest order. Collisions alias a single `.sif`,
/// which the basename-derived keying cannot represent.
pub fn conflicting_keys(manifest: &ResourceManifest) -> Vec<(String, Vec<String>)> {
    let mut by_key: HashMap<String, Vec<String>> = HashMap::new();
    let mut order = Vec::new();

    for (_, uri) in manifest.entries() {
        let key = cache_key(uri);
        let uris = by_key.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            Vec::new()
        });
        if !uris.iter().any(|u| u == uri) {
            uris.push(uri.to_string());
        }
    }

    order
        .into_iter()
        .filter_map(|key| {
            let uris = by_key.remove(&key)?;
            (uris.len() > 1).then_some((key, uris))
        })
        .collect()
}
