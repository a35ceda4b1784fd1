//! Cache directory guard
//!
//! Enforces the single-purpose-directory and single-owner invariants on a
//! cache location before any cache operation proceeds. The ownership check
//! is advisory and point-in-time: no lock is held against concurrent
//! invocations from other users.

use crate::error::{ExoflowError, ExoflowResult};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate a cache location, creating it if absent.
///
/// Fails when the path exists as a regular file (the file is left
/// untouched) or when the nested `cache` subdirectory that the container
/// runtime manages is owned by a different user. Only that one nested
/// path is inspected; other pre-existing contents are deliberately
/// allowed so a cache can be shared above the per-user boundary.
pub fn ensure_cache_dir(path: &Path) -> ExoflowResult<PathBuf> {
    if !path.exists() {
        std::fs::create_dir_all(path)
            .map_err(|e| ExoflowError::io(format!("creating cache directory {}", path.display()), e))?;
        debug!("Created cache directory {}", path.display());
        return Ok(path.to_path_buf());
    }

    if path.is_file() {
        return Err(ExoflowError::CacheNotDirectory(path.to_path_buf()));
    }

    let nested = path.join("cache");
    if nested.exists() {
        let owner = owner_uid(&nested)?;
        let me = invoking_uid();
        if owner != me {
            return Err(ExoflowError::CacheOwnership {
                path: path.to_path_buf(),
                owner,
            });
        }
    }

    Ok(path.to_path_buf())
}

#[cfg(unix)]
fn owner_uid(path: &Path) -> ExoflowResult<u32> {
    use std::os::unix::fs::MetadataExt;
    let meta = std::fs::metadata(path)
        .map_err(|e| ExoflowError::io(format!("reading metadata for {}", path.display()), e))?;
    Ok(meta.uid())
}

#[cfg(unix)]
fn invoking_uid() -> u32 {
    // Real uid, matching what the container runtime enforces on its cache
    unsafe { libc::getuid() }
}
