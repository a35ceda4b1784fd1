//! Run command - initialize, dry-run, or execute a pipeline run
//!
//! Every invocation re-derives its plan from current inputs (CLI flags,
//! on-disk config, genome manifest); no transition history is kept, so
//! init and dryrun are safe to repeat against the same inputs.

use crate::cache::ensure_cache_dir;
use crate::cli::args::{ExecMode, RunArgs, RunMode};
use crate::config::{self, PipelineBase, RunConfig};
use crate::config::schema::{GenomeConfig, ProjectMeta};
use crate::engine;
use crate::error::{ExoflowError, ExoflowResult};
use crate::paths;
use crate::scheduler::{self, request::Backend, ClusterProfile, SubmissionRequest};
use chrono::Utc;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info};

/// Scheduler parameters for the pipeline's master job. The master job
/// itself drives the workflow engine, so it is long but lightweight.
const RUN_GRES: &str = "lscratch:500";
const RUN_TIME_LIMIT: &str = "5-00:00:00";
const RUN_MAIL_EVENTS: &str = "BEGIN,END,FAIL";

/// Execute the run command
pub async fn execute(
    args: RunArgs,
    base: &PipelineBase,
    profile: ClusterProfile,
) -> ExoflowResult<()> {
    let run_dir = paths::expand(&args.output)?;

    match args.runmode {
        RunMode::Init => init(&args, &run_dir, base, profile).await,
        RunMode::Dryrun => dryrun(&run_dir).await,
        RunMode::Run => run(&args, &run_dir, base).await,
    }
}

/// Prepare the run directory: validated inputs symlinked in, resolved
/// configuration written out. Terminal on success and safe to repeat.
async fn init(
    args: &RunArgs,
    run_dir: &Path,
    base: &PipelineBase,
    profile: ClusterProfile,
) -> ExoflowResult<()> {
    let inputs = validate_inputs(&args.input)?;

    let genome_config_path = config::resolve_genome(base, profile, &args.genome)?;
    let genome = GenomeConfig::load(&genome_config_path).await?;

    let targets = match &args.targets {
        Some(path) => paths::require_readable(path)?,
        None => genome.targets.clone().ok_or_else(|| {
            ExoflowError::User(format!(
                "Genome '{}' defines no default targets; provide --targets",
                args.genome
            ))
        })?,
    };

    let pairs = match &args.pairs {
        Some(path) => Some(paths::require_readable(path)?),
        None => None,
    };

    create_run_dirs(run_dir).await?;
    link_inputs(&inputs, &run_dir.join("fastqs"))?;

    let singularity_cache = match &args.singularity_cache {
        Some(path) => ensure_cache_dir(&paths::expand(path)?)?,
        None => ensure_cache_dir(&run_dir.join(".singularity"))?,
    };

    let sif_cache = match &args.sif_cache {
        Some(path) => Some(ensure_cache_dir(&paths::expand(path)?)?),
        None => None,
    };

    let tmp_dir = args
        .tmp_dir
        .clone()
        .unwrap_or_else(|| profile.default_tmp_dir(run_dir));

    let run_config = RunConfig {
        project: ProjectMeta {
            version: env!("CARGO_PKG_VERSION").to_string(),
            created: Utc::now(),
            pipeline_home: base.root().to_path_buf(),
            cluster: profile.to_string(),
        },
        inputs,
        genome: args.genome.clone(),
        genome_config: genome_config_path,
        targets,
        callers: args.callers.iter().map(ToString::to_string).collect(),
        pairs,
        ffpe: args.ffpe,
        cnv: args.cnv,
        sif_cache,
        singularity_cache,
        tmp_dir,
        threads: args.threads,
    };

    let config_path = run_config.write(run_dir).await?;
    info!("Resolved configuration written to {}", config_path.display());

    println!(
        "{} Initialized run directory {}",
        style("✓").green(),
        run_dir.display()
    );
    Ok(())
}

/// Validate the resolved plan against the workflow engine without
/// executing anything.
async fn dryrun(run_dir: &Path) -> ExoflowResult<()> {
    // Loading doubles as the initialization check
    let run_config = RunConfig::load(run_dir).await?;
    debug!(
        "Dry-running {} against genome {}",
        run_dir.display(),
        run_config.genome
    );

    let report = engine::dry_run(run_dir).await?;
    print!("{}", report);

    println!(
        "{} Dry-run complete, the resolved plan is valid",
        style("✓").green()
    );
    Ok(())
}

/// Submit the pipeline for real execution.
async fn run(args: &RunArgs, run_dir: &Path, base: &PipelineBase) -> ExoflowResult<()> {
    let run_config = load_config_with_overrides(args, run_dir).await?;

    match args.mode {
        ExecMode::Local => {
            info!("Running workflow locally with {} cores", run_config.threads);
            engine::run_local(run_dir, run_config.threads).await
        }
        ExecMode::Slurm => {
            let payload = base.require_payload(base.runner())?;
            let request = SubmissionRequest {
                job_name: args.job_name.clone(),
                payload,
                backend: Backend::Slurm,
                workdir: run_dir.to_path_buf(),
                cache_dir: run_config
                    .sif_cache
                    .clone()
                    .unwrap_or_else(|| run_config.singularity_cache.clone()),
                items: vec![run_dir.display().to_string()],
                scratch_template: run_config.tmp_dir.clone(),
                gres: RUN_GRES.to_string(),
                time_limit: RUN_TIME_LIMIT.to_string(),
                mail_events: RUN_MAIL_EVENTS.to_string(),
                wait: args.wait,
            };

            let pb = if args.silent {
                None
            } else {
                Some(create_progress_bar("Submitting master job..."))
            };

            let result = scheduler::submit(&request).await;

            if let Some(pb) = pb {
                pb.finish_and_clear();
            }

            let handle = result?;
            if args.silent {
                println!("{}", handle);
            } else {
                println!(
                    "{} Master job {} submitted as {}",
                    style("✓").green(),
                    style(&args.job_name).cyan(),
                    style(&handle).cyan()
                );
                if args.wait {
                    println!("  Master job reached a terminal state.");
                }
            }
            Ok(())
        }
    }
}

/// Load the run's resolved configuration and fold in any cache or
/// scratch flags given on this invocation. Overrides are written back so
/// the engine and the master job observe the same values.
async fn load_config_with_overrides(args: &RunArgs, run_dir: &Path) -> ExoflowResult<RunConfig> {
    let mut run_config = RunConfig::load(run_dir).await?;
    let mut changed = false;

    if let Some(path) = &args.sif_cache {
        run_config.sif_cache = Some(ensure_cache_dir(&paths::expand(path)?)?);
        changed = true;
    }
    if let Some(path) = &args.singularity_cache {
        run_config.singularity_cache = ensure_cache_dir(&paths::expand(path)?)?;
        changed = true;
    }
    if let Some(tmp_dir) = &args.tmp_dir {
        run_config.tmp_dir = tmp_dir.clone();
        changed = true;
    }

    if changed {
        let config_path = run_config.write(run_dir).await?;
        info!("Updated configuration written to {}", config_path.display());
    }
    Ok(run_config)
}

fn validate_inputs(inputs: &[PathBuf]) -> ExoflowResult<Vec<PathBuf>> {
    inputs.iter().map(|p| paths::require_readable(p)).collect()
}

async fn create_run_dirs(run_dir: &Path) -> ExoflowResult<()> {
    for dir in [
        run_dir.to_path_buf(),
        run_dir.join("logfiles"),
        run_dir.join("fastqs"),
    ] {
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| ExoflowError::io(format!("creating directory {}", dir.display()), e))?;
    }
    Ok(())
}

/// Symlink validated inputs into the run directory. Existing links are
/// left alone so re-running init is a no-op.
fn link_inputs(inputs: &[PathBuf], fastq_dir: &Path) -> ExoflowResult<()> {
    for input in inputs {
        let name = input
            .file_name()
            .ok_or_else(|| ExoflowError::PathInvalid {
                path: input.clone(),
                reason: "input has no filename".to_string(),
            })?;
        let link = fastq_dir.join(name);
        if link.exists() {
            debug!("Input already linked: {}", link.display());
            continue;
        }
        std::os::unix::fs::symlink(input, &link)
            .map_err(|e| ExoflowError::io(format!("linking {}", link.display()), e))?;
    }
    Ok(())
}

fn create_progress_bar(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
