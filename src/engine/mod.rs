//! Workflow engine invocations
//!
//! The engine (Snakemake) owns the run directory's lock state and all
//! scientific computation; this module only drives it: unlock a previous
//! run's directory, dry-run a resolved plan, or run it locally. Every
//! call blocks until the child process exits.

use crate::error::{ExoflowError, ExoflowResult};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Name of the resolved configuration file inside a run directory.
pub const CONFIGFILE: &str = "config.json";

/// Remove the engine's lock on a run directory.
///
/// Exit 0 means unlocked, whether or not a lock actually existed, so the
/// operation is idempotent. The caller must have verified the pipeline is
/// not running; no liveness check is performed here.
pub async fn unlock(run_dir: &Path) -> ExoflowResult<()> {
    let output = run_engine(
        run_dir,
        &["--unlock", "--cores", "1", &configfile_arg()],
    )
    .await?;

    if output.status.success() {
        Ok(())
    } else {
        Err(ExoflowError::Unlock {
            output: combined_output(&output),
        })
    }
}

/// Validate the resolved plan without executing anything.
///
/// Returns the engine's dry-run report on success.
pub async fn dry_run(run_dir: &Path) -> ExoflowResult<String> {
    let output = run_engine(
        run_dir,
        &["--dry-run", "--printshellcmds", &configfile_arg()],
    )
    .await?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    } else {
        Err(ExoflowError::DryRun {
            output: combined_output(&output),
        })
    }
}

/// Run the workflow locally, inheriting stdio, blocking until it exits.
pub async fn run_local(run_dir: &Path, cores: u32) -> ExoflowResult<()> {
    let cores = cores.to_string();
    let configfile = configfile_arg();
    let args = ["--cores", cores.as_str(), "--use-singularity", configfile.as_str()];
    debug!("Executing in {}: snakemake {:?}", run_dir.display(), args);

    let status = Command::new("snakemake")
        .args(args)
        .current_dir(run_dir)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|e| ExoflowError::command_failed("snakemake", e))?;

    if status.success() {
        Ok(())
    } else {
        Err(ExoflowError::EngineExit(status.code().unwrap_or(-1)))
    }
}

fn configfile_arg() -> String {
    format!("--configfile={}", CONFIGFILE)
}

async fn run_engine(run_dir: &Path, args: &[&str]) -> ExoflowResult<std::process::Output> {
    debug!("Executing in {}: snakemake {:?}", run_dir.display(), args);

    Command::new("snakemake")
        .args(args)
        .current_dir(run_dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| ExoflowError::command_failed(format!("snakemake {:?}", args), e))
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let mut combined = String::new();
    combined.push_str(stdout.trim_end());
    if !stdout.trim_end().is_empty() && !stderr.trim_end().is_empty() {
        combined.push('\n');
    }
    combined.push_str(stderr.trim_end());
    combined
}
