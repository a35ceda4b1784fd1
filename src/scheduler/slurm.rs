//! sbatch submission
//!
//! Submission is fire-and-forget: on success the scheduler's parsable job
//! id is returned and nothing here tracks the job further. On failure the
//! scheduler's combined output is surfaced verbatim.

use crate::error::{ExoflowError, ExoflowResult};
use crate::scheduler::request::SubmissionRequest;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Opaque scheduler-assigned job id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle(pub String);

impl std::fmt::Display for JobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Submit a batch job and return its handle.
///
/// Blocks until sbatch itself exits; with `request.wait` set, sbatch
/// blocks until the job reaches a terminal state, so this call does too.
pub async fn submit(request: &SubmissionRequest) -> ExoflowResult<JobHandle> {
    let args = request.to_args();
    debug!("Submitting: sbatch {:?}", args);

    let output = Command::new("sbatch")
        .args(&args)
        .current_dir(&request.workdir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| ExoflowError::command_failed(request.describe(), e))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if output.status.success() {
        let job_id = stdout.trim().to_string();
        info!("Master job submitted: {}", job_id);
        Ok(JobHandle(job_id))
    } else {
        let mut combined = String::new();
        combined.push_str(stdout.trim_end());
        if !stdout.trim_end().is_empty() && !stderr.trim_end().is_empty() {
            combined.push('\n');
        }
        combined.push_str(stderr.trim_end());

        Err(ExoflowError::Submission {
            command: request.describe(),
            code: output.status.code().unwrap_or(-1),
            output: combined,
        })
    }
}
