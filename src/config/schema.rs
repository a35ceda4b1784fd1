//! Resolved run configuration
//!
//! `init` resolves CLI parameters plus the genome configuration into a
//! `config.json` inside the run directory; the workflow engine consumes
//! that file on every subsequent invocation. Nothing else is persisted
//! between invocations.

use crate::engine::CONFIGFILE;
use crate::error::{ExoflowError, ExoflowResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Genome configuration document (static JSON shipped with the pipeline).
///
/// Only the fields this driver reads are typed; everything else passes
/// through untouched for the workflow engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenomeConfig {
    /// Default exome targets BED for this genome, used when the operator
    /// does not provide --targets
    #[serde(default)]
    pub targets: Option<PathBuf>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl GenomeConfig {
    /// Load a genome configuration from its JSON file.
    pub async fn load(path: &Path) -> ExoflowResult<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| ExoflowError::io(format!("reading genome config {}", path.display()), e))?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Project metadata recorded at init time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMeta {
    /// Driver version that initialized the run directory
    pub version: String,
    /// Initialization timestamp
    pub created: DateTime<Utc>,
    /// Pipeline installation the run was resolved against
    pub pipeline_home: PathBuf,
    /// Cluster profile the run was resolved on
    pub cluster: String,
}

/// Fully resolved run configuration written to `<run_dir>/config.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub project: ProjectMeta,

    /// Input FASTQ/BAM files, validated readable at init
    pub inputs: Vec<PathBuf>,

    /// Reference genome name
    pub genome: String,
    /// Genome configuration file the engine reads references from
    pub genome_config: PathBuf,
    /// Exome targets BED (operator-supplied or genome default)
    pub targets: PathBuf,

    /// Variant callers to run
    pub callers: Vec<String>,
    /// Tumor/normal pairs file, when provided
    #[serde(default)]
    pub pairs: Option<PathBuf>,
    /// FFPE artifact filtering enabled
    #[serde(default)]
    pub ffpe: bool,
    /// Copy-number calling enabled
    #[serde(default)]
    pub cnv: bool,

    /// Local SIF cache, when provided
    #[serde(default)]
    pub sif_cache: Option<PathBuf>,
    /// Singularity layer cache
    pub singularity_cache: PathBuf,
    /// Temporary-directory template, expanded by the scheduler
    pub tmp_dir: String,
    /// Max threads for local processes
    pub threads: u32,
}

impl RunConfig {
    /// Path of the resolved configuration inside a run directory.
    pub fn path(run_dir: &Path) -> PathBuf {
        run_dir.join(CONFIGFILE)
    }

    /// Write the resolved configuration into the run directory.
    pub async fn write(&self, run_dir: &Path) -> ExoflowResult<PathBuf> {
        let path = Self::path(run_dir);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content)
            .await
            .map_err(|e| ExoflowError::io(format!("writing {}", path.display()), e))?;
        Ok(path)
    }

    /// Load the resolved configuration from an initialized run directory.
    pub async fn load(run_dir: &Path) -> ExoflowResult<Self> {
        let path = Self::path(run_dir);
        if !path.exists() {
            return Err(ExoflowError::RunNotInitialized(run_dir.to_path_buf()));
        }
        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| ExoflowError::io(format!("reading {}", path.display()), e))?;
        Ok(serde_json::from_str(&content)?)
    }
}
