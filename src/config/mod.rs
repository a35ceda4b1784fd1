//! Pipeline base and genome configuration
//!
//! The pipeline base is the installed directory holding static assets
//! (container manifest, genome configuration JSONs) and the payload
//! scripts submitted to the scheduler. It is resolved once at startup
//! and threaded through as a value.

pub mod schema;

pub use schema::{GenomeConfig, RunConfig};

use crate::error::{ExoflowError, ExoflowResult};
use crate::scheduler::ClusterProfile;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding the pipeline installation directory.
pub const HOME_ENV: &str = "EXOFLOW_HOME";

/// Resolved pipeline installation directory.
#[derive(Debug, Clone)]
pub struct PipelineBase {
    root: PathBuf,
}

impl PipelineBase {
    /// Resolve the base: `EXOFLOW_HOME` when set, otherwise the
    /// grandparent of the running executable (bin/exoflow -> install root).
    pub fn resolve() -> ExoflowResult<Self> {
        if let Some(home) = std::env::var_os(HOME_ENV) {
            let root = crate::paths::expand(Path::new(&home))?;
            if !root.is_dir() {
                return Err(ExoflowError::PipelineBaseMissing(root));
            }
            debug!("Pipeline base from {}: {}", HOME_ENV, root.display());
            return Ok(Self { root });
        }

        let exe = std::env::current_exe()
            .map_err(|e| ExoflowError::io("resolving executable path", e))?;
        let root = exe
            .parent()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .ok_or_else(|| ExoflowError::PipelineBaseMissing(exe.clone()))?;
        debug!("Pipeline base from executable: {}", root.display());
        Ok(Self { root })
    }

    /// Build a base rooted at an explicit directory.
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    /// Installation root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Default container-image manifest shipped with the pipeline.
    pub fn images_manifest(&self) -> PathBuf {
        self.root.join("assets").join("images.json")
    }

    /// Genome configuration directory for a cluster profile.
    ///
    /// Falls back to the `generic` directory when no profile-specific
    /// one is installed, so a plain checkout works off-cluster.
    pub fn genomes_dir(&self, profile: ClusterProfile) -> PathBuf {
        let specific = self
            .root
            .join("assets")
            .join("genomes")
            .join(profile.to_string());
        if specific.is_dir() {
            specific
        } else {
            self.root.join("assets").join("genomes").join("generic")
        }
    }

    /// Payload script that pulls missing SIFs on an allocated node.
    pub fn cacher(&self) -> PathBuf {
        self.root.join("resources").join("cacher")
    }

    /// Payload script that drives the workflow engine as the master job.
    pub fn runner(&self) -> PathBuf {
        self.root.join("resources").join("runner")
    }

    /// Require that a payload script exists before submitting it.
    pub fn require_payload(&self, payload: PathBuf) -> ExoflowResult<PathBuf> {
        if payload.is_file() {
            Ok(payload)
        } else {
            Err(ExoflowError::PayloadMissing(payload))
        }
    }
}

/// Discover installed genome configurations for a cluster profile.
///
/// Returns genome name (file stem) -> configuration JSON path, sorted by
/// name for stable listings.
pub fn genome_configs(
    base: &PipelineBase,
    profile: ClusterProfile,
) -> ExoflowResult<BTreeMap<String, PathBuf>> {
    let dir = base.genomes_dir(profile);
    if !dir.is_dir() {
        return Err(ExoflowError::GenomesDirMissing(dir));
    }

    let entries = std::fs::read_dir(&dir)
        .map_err(|e| ExoflowError::io(format!("listing genomes in {}", dir.display()), e))?;

    let mut genomes = BTreeMap::new();
    for entry in entries {
        let entry = entry
            .map_err(|e| ExoflowError::io(format!("listing genomes in {}", dir.display()), e))?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                genomes.insert(stem.to_string(), path.clone());
            }
        }
    }

    Ok(genomes)
}

/// Resolve a genome name to its configuration file.
pub fn resolve_genome(
    base: &PipelineBase,
    profile: ClusterProfile,
    genome: &str,
) -> ExoflowResult<PathBuf> {
    let genomes = genome_configs(base, profile)?;
    genomes
        .get(genome)
        .cloned()
        .ok_or_else(|| ExoflowError::GenomeUnknown {
            genome: genome.to_string(),
            available: genomes.keys().cloned().collect::<Vec<_>>().join(", "),
        })
}
