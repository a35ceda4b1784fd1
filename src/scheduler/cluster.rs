//! Cluster identification
//!
//! Some clusters carry site-specific conventions (scratch-space layout in
//! particular). The cluster name is probed once at startup via
//! `scontrol show config` and the resulting profile is passed by value to
//! whoever needs it; nothing re-queries the environment per call.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Known cluster platforms with site-specific defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterProfile {
    /// NIH Biowulf: node-local scratch under /lscratch
    Biowulf,
    /// NCI FRCE (Slurm cluster name "fnlcr")
    Frce,
    /// Any other or unknown cluster
    Generic,
}

impl ClusterProfile {
    /// Probe the scheduler for the cluster name.
    ///
    /// A missing scheduler or empty output maps to `Generic`; the probe
    /// never fails the invocation.
    pub async fn detect() -> Self {
        let output = Command::new("scontrol")
            .args(["show", "config"])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await;

        let stdout = match output {
            Ok(o) => String::from_utf8_lossy(&o.stdout).to_string(),
            Err(_) => {
                debug!("scontrol not available, assuming generic cluster");
                return Self::Generic;
            }
        };

        let config = parse_scontrol(&stdout);
        let profile = Self::from_cluster_name(config.get("ClusterName").map(String::as_str));
        debug!("Detected cluster profile: {}", profile);
        profile
    }

    /// Map a Slurm cluster name to a profile.
    pub fn from_cluster_name(name: Option<&str>) -> Self {
        match name {
            Some("biowulf") => Self::Biowulf,
            Some("fnlcr") => Self::Frce,
            _ => Self::Generic,
        }
    }

    /// Default temporary-directory template for this cluster.
    ///
    /// The returned value may contain scheduler variables (e.g.
    /// `$SLURM_JOBID`) that are expanded by the scheduler, never locally.
    /// The run directory is the fallback where no site convention exists.
    pub fn default_tmp_dir(&self, run_dir: &Path) -> String {
        match self {
            Self::Biowulf => "/lscratch/$SLURM_JOBID".to_string(),
            Self::Frce | Self::Generic => run_dir.display().to_string(),
        }
    }
}

impl fmt::Display for ClusterProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Biowulf => "biowulf",
            Self::Frce => "frce",
            Self::Generic => "generic",
        };
        write!(f, "{}", name)
    }
}

/// Parse `scontrol show config` output into a key/value map.
///
/// Lines look like `ClusterName             = biowulf`; lines without an
/// `=` are ignored.
pub fn parse_scontrol(output: &str) -> HashMap<String, String> {
    let mut config = HashMap::new();
    for line in output.lines() {
        if let Some((key, value)) = line.split_once('=') {
            config.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    config
}
