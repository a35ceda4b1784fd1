//! exoflow - driver for a containerized whole-exome analysis workflow
//!
//! Prepares run directories, caches container images, submits the
//! pipeline's master job to Slurm, and reconciles workflow-engine locks.

pub mod cache;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod paths;
pub mod scheduler;

pub use error::{ExoflowError, ExoflowResult};
