//! Path resolution and validation
//!
//! Every user-supplied path flows through here before other components
//! touch it. Validation is pure and stateless: existence, readability,
//! and type checks only.

use crate::error::{ExoflowError, ExoflowResult};
use std::env;
use std::path::{Path, PathBuf};

/// Expand a leading `~` and absolutize against the current directory.
///
/// No symlink resolution is performed; the path does not need to exist.
pub fn expand(path: &Path) -> ExoflowResult<PathBuf> {
    let expanded = if let Ok(stripped) = path.strip_prefix("~") {
        match dirs::home_dir() {
            Some(home) => home.join(stripped),
            None => path.to_path_buf(),
        }
    } else {
        path.to_path_buf()
    };

    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        let cwd =
            env::current_dir().map_err(|e| ExoflowError::io("getting current directory", e))?;
        Ok(cwd.join(expanded))
    }
}

/// Require that a path exists and is readable by the invoking user.
///
/// Returns the expanded absolute path on success.
pub fn require_readable(path: &Path) -> ExoflowResult<PathBuf> {
    let abs = expand(path)?;
    if !abs.exists() {
        return Err(ExoflowError::PathNotFound(abs));
    }
    // A metadata read doubles as a readability probe; permission errors
    // surface here rather than later inside the workflow engine.
    match std::fs::metadata(&abs) {
        Ok(_) => Ok(abs),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(ExoflowError::PathNotReadable(abs))
        }
        Err(e) => Err(ExoflowError::io(
            format!("reading metadata for {}", abs.display()),
            e,
        )),
    }
}

/// Require that a path exists and is a directory.
pub fn require_dir(path: &Path) -> ExoflowResult<PathBuf> {
    let abs = require_readable(path)?;
    if !abs.is_dir() {
        return Err(ExoflowError::PathInvalid {
            path: abs,
            reason: "not a directory".to_string(),
        });
    }
    Ok(abs)
}
