//! Local SIF cache reconciliation
//!
//! The cache holds single-file container images (SIFs) pulled from remote
//! registries so the pipeline never re-pulls on every run. The filesystem
//! is the index: a SIF either exists under the cache directory or it does
//! not, and reconciliation is a pure read of that state. Mutation happens
//! only through a separately submitted cacher job.

pub mod guard;
pub mod manifest;
pub mod reconcile;

pub use guard::ensure_cache_dir;
pub use manifest::ResourceManifest;
pub use reconcile::{cache_key, reconcile, PullList};
