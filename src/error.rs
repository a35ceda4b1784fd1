//! Error types for exoflow
//!
//! All modules use `ExoflowResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for exoflow operations
pub type ExoflowResult<T> = Result<T, ExoflowError>;

/// All errors that can occur in exoflow
#[derive(Error, Debug)]
pub enum ExoflowError {
    // Configuration errors
    #[error("Cache path {0} already exists as a regular file. Caches must be directories; re-run with a different path.")]
    CacheNotDirectory(PathBuf),

    #[error("Cache directory {path} contains a nested cache owned by another user (uid {owner}). Re-run with a cache location you own.")]
    CacheOwnership { path: PathBuf, owner: u32 },

    #[error("Invalid image manifest at {path}: {reason}")]
    ManifestInvalid { path: PathBuf, reason: String },

    #[error("Unknown genome '{genome}'. Available genomes: {available}")]
    GenomeUnknown { genome: String, available: String },

    #[error("Genome configuration directory not found: {0}")]
    GenomesDirMissing(PathBuf),

    #[error("Run directory {0} is not initialized (no config.json). Run with --runmode init first.")]
    RunNotInitialized(PathBuf),

    #[error("Pipeline base directory not found: {0}. Set EXOFLOW_HOME to the pipeline installation.")]
    PipelineBaseMissing(PathBuf),

    #[error("Payload script not found: {0}")]
    PayloadMissing(PathBuf),

    // Path errors
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Path exists but is not readable: {0}")]
    PathNotReadable(PathBuf),

    #[error("Invalid path: {path}: {reason}")]
    PathInvalid { path: PathBuf, reason: String },

    // Scheduler errors
    #[error("Job submission failed: {command} exited with code {code}\n{output}")]
    Submission {
        command: String,
        code: i32,
        output: String,
    },

    // Workflow engine errors
    #[error("Failed to unlock working directory:\n{output}")]
    Unlock { output: String },

    #[error("Workflow engine dry-run failed:\n{output}")]
    DryRun { output: String },

    #[error("Workflow engine exited with code {0}")]
    EngineExit(i32),

    // Process errors
    #[error("Command failed to start: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // General errors
    #[error("{0}")]
    User(String),
}

impl ExoflowError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::CacheNotDirectory(_) => Some("Choose a path that is not an existing file"),
            Self::CacheOwnership { .. } => {
                Some("Shared caches are only supported above the per-user cache boundary")
            }
            Self::RunNotInitialized(_) => Some("Run: exoflow run --runmode init ..."),
            Self::PipelineBaseMissing(_) => Some("Set EXOFLOW_HOME to the pipeline installation"),
            Self::Unlock { .. } => {
                Some("Verify the pipeline is not still running before unlocking")
            }
            Self::CommandFailed { .. } => {
                Some("Check that the scheduler and workflow engine are on $PATH")
            }
            _ => None,
        }
    }
}
