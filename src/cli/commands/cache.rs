//! Cache command - reconcile the local SIF cache and submit the cacher job

use crate::cache::{ensure_cache_dir, reconcile, ResourceManifest};
use crate::cli::args::CacheArgs;
use crate::config::PipelineBase;
use crate::error::ExoflowResult;
use crate::paths;
use crate::scheduler::{self, request::Backend, SubmissionRequest};
use console::style;
use tracing::debug;

/// Scheduler parameters for the cacher job. Pulls are network-bound and
/// need node-local scratch for intermediate layers.
const CACHE_JOB_NAME: &str = "pl:cache";
const CACHE_GRES: &str = "lscratch:200";
const CACHE_TIME_LIMIT: &str = "10:00:00";
const CACHE_MAIL_EVENTS: &str = "BEGIN,END,FAIL";
const CACHE_SCRATCH_TEMPLATE: &str = "/lscratch/${SLURM_JOB_ID}/.singularity/";

/// Execute the cache command
pub async fn execute(args: CacheArgs, base: &PipelineBase) -> ExoflowResult<()> {
    let cache_dir = ensure_cache_dir(&paths::expand(&args.sif_cache)?)?;
    debug!("SIF cache directory: {}", cache_dir.display());

    let manifest_path = base.images_manifest();
    let manifest = ResourceManifest::load(&manifest_path).await?;

    let pull = reconcile(&manifest, &cache_dir)?;

    if pull.is_empty() {
        println!("SIF cache is already up to date.");
        return Ok(());
    }

    if args.dry_run {
        println!(
            "{} {} image(s) would be pulled (dry run, nothing submitted).",
            style("○").dim(),
            pull.len()
        );
        return Ok(());
    }

    let payload = base.require_payload(base.cacher())?;
    let request = SubmissionRequest {
        job_name: CACHE_JOB_NAME.to_string(),
        payload,
        backend: Backend::Slurm,
        workdir: cache_dir.clone(),
        cache_dir,
        items: pull,
        scratch_template: CACHE_SCRATCH_TEMPLATE.to_string(),
        gres: CACHE_GRES.to_string(),
        time_limit: CACHE_TIME_LIMIT.to_string(),
        mail_events: CACHE_MAIL_EVENTS.to_string(),
        wait: false,
    };

    let handle = scheduler::submit(&request).await?;
    println!(
        "{} Image cacher submitted as master job {}",
        style("✓").green(),
        style(&handle).cyan()
    );

    Ok(())
}
