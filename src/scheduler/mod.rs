//! Slurm scheduler integration
//!
//! Everything this crate requires from the scheduler is submit-and-return
//! a handle. Job lifecycle beyond submission belongs to Slurm; the only
//! blocking behavior offered is sbatch's own `--wait`.

pub mod cluster;
pub mod request;
pub mod slurm;

pub use cluster::ClusterProfile;
pub use request::SubmissionRequest;
pub use slurm::{submit, JobHandle};
