//! Batch job submission requests
//!
//! A `SubmissionRequest` is built per invocation, submitted exactly once,
//! and discarded. The sbatch invocation is a discrete argument vector, so
//! attacker-controlled filenames or URIs can never split into extra
//! arguments or reach a shell.

use std::path::PathBuf;

/// Execution backend passed to the payload script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Slurm,
    Local,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slurm => "slurm",
            Self::Local => "local",
        }
    }
}

/// A single batch-job submission for the scheduler.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    /// Scheduler job name (-J)
    pub job_name: String,
    /// Payload script invoked on the allocated node
    pub payload: PathBuf,
    /// Execution backend selector handed to the payload
    pub backend: Backend,
    /// Working directory for the submission command
    pub workdir: PathBuf,
    /// SIF cache directory (-s)
    pub cache_dir: PathBuf,
    /// Comma-joined pull list or workflow parameters (-i)
    pub items: Vec<String>,
    /// Scratch-space template consumed by the scheduler (-t)
    pub scratch_template: String,
    /// Generic resource request, e.g. "lscratch:200"
    pub gres: String,
    /// Wall-clock limit, e.g. "10:00:00"
    pub time_limit: String,
    /// Mail notification triggers, e.g. "BEGIN,END,FAIL"
    pub mail_events: String,
    /// Block until the job reaches a terminal state (sbatch --wait)
    pub wait: bool,
}

impl SubmissionRequest {
    /// Build the sbatch argument vector for this request.
    ///
    /// `--parsable` makes a successful submission print the bare job id.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "--parsable".to_string(),
            "-J".to_string(),
            self.job_name.clone(),
            format!("--gres={}", self.gres),
            format!("--time={}", self.time_limit),
            format!("--mail-type={}", self.mail_events),
        ];

        if self.wait {
            args.push("--wait".to_string());
        }

        args.push(self.payload.display().to_string());
        args.push(self.backend.as_str().to_string());
        args.push("-s".to_string());
        args.push(self.cache_dir.display().to_string());
        args.push("-i".to_string());
        args.push(self.items.join(","));
        args.push("-t".to_string());
        args.push(self.scratch_template.clone());

        args
    }

    /// Human-readable command line for diagnostics.
    pub fn describe(&self) -> String {
        format!("sbatch {}", self.to_args().join(" "))
    }
}
