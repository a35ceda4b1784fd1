//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::fmt;
use std::path::PathBuf;

/// exoflow - whole-exome analysis pipeline driver
///
/// Prepares run directories, caches container images locally, and
/// submits the pipeline's master job to the cluster.
#[derive(Parser, Debug)]
#[command(name = "exoflow")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize, dry-run, or run the pipeline on input files
    Run(RunArgs),

    /// Unlock a previous run's working directory
    Unlock(UnlockArgs),

    /// Cache remote container images locally
    Cache(CacheArgs),
}

/// How the pipeline is deployed for a run directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    /// Initialize and prepare the run directory
    Init,
    /// Validate the resolved plan without executing
    Dryrun,
    /// Submit the pipeline for real execution
    Run,
}

/// Execution backend for the master job
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExecMode {
    /// Submit to the Slurm scheduler (recommended)
    Slurm,
    /// Run the workflow engine serially on this host
    Local,
}

/// Supported variant callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Caller {
    Mutect2,
    Mutect,
    Strelka,
    Vardict,
    Varscan,
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mutect2 => "mutect2",
            Self::Mutect => "mutect",
            Self::Strelka => "strelka",
            Self::Vardict => "vardict",
            Self::Varscan => "varscan",
        };
        write!(f, "{}", name)
    }
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Runmode: init prepares the run directory, dryrun validates the
    /// plan, run submits for execution
    #[arg(long, value_enum)]
    pub runmode: RunMode,

    /// Input FastQ or BAM file(s) to process
    #[arg(long, required = true, num_args = 1..)]
    pub input: Vec<PathBuf>,

    /// Run directory (created by --runmode init if missing)
    #[arg(long)]
    pub output: PathBuf,

    /// Reference genome (e.g. hg38, mm10)
    #[arg(long)]
    pub genome: String,

    /// Exome targets BED file; defaults from the genome configuration
    #[arg(long)]
    pub targets: Option<PathBuf>,

    /// Execution method for the master job
    #[arg(long, value_enum, default_value_t = ExecMode::Slurm)]
    pub mode: ExecMode,

    /// Name of the pipeline's master job
    #[arg(long, default_value = "pl:exoflow")]
    pub job_name: String,

    /// Variant callers to run
    #[arg(long, value_enum, num_args = 1..,
          default_values_t = [Caller::Mutect2, Caller::Mutect, Caller::Strelka, Caller::Vardict, Caller::Varscan])]
    pub callers: Vec<Caller>,

    /// Tumor/normal pairs file (tab-delimited, Tumor and Normal columns)
    #[arg(long)]
    pub pairs: Option<PathBuf>,

    /// Run the additional FFPE artifact filtering step
    #[arg(long)]
    pub ffpe: bool,

    /// Call copy number variations (tumor-normal pairs only)
    #[arg(long)]
    pub cnv: bool,

    /// Wait until the master job completes before returning
    #[arg(long)]
    pub wait: bool,

    /// Print only the master job id on submission
    #[arg(long)]
    pub silent: bool,

    /// Singularity layer cache (defaults to <output>/.singularity);
    /// cannot be shared across users
    #[arg(long, env = "SINGULARITY_CACHEDIR")]
    pub singularity_cache: Option<PathBuf>,

    /// Shared local cache of SIF images (see: exoflow cache)
    #[arg(long)]
    pub sif_cache: Option<PathBuf>,

    /// Temporary-directory template for intermediate files; scheduler
    /// variables like $SLURM_JOBID are expanded by the scheduler
    #[arg(long)]
    pub tmp_dir: Option<String>,

    /// Max number of threads for local processes
    #[arg(long, default_value_t = 2)]
    pub threads: u32,
}

/// Arguments for the unlock command
#[derive(Parser, Debug)]
pub struct UnlockArgs {
    /// Run directory to unlock. Verify the pipeline is NOT running
    /// before using this command.
    #[arg(long)]
    pub output: PathBuf,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Path where the local cache of SIFs is stored; can be shared
    /// across users when permissions allow
    #[arg(long)]
    pub sif_cache: PathBuf,

    /// Only display what remote resources would be pulled
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_cache() {
        let cli = Cli::parse_from(["exoflow", "cache", "--sif-cache", "/scratch/cache"]);
        match cli.command {
            Commands::Cache(args) => {
                assert_eq!(args.sif_cache, PathBuf::from("/scratch/cache"));
                assert!(!args.dry_run);
            }
            _ => panic!("expected Cache command"),
        }
    }

    #[test]
    fn cli_parses_cache_dry_run() {
        let cli = Cli::parse_from([
            "exoflow",
            "cache",
            "--sif-cache",
            "/scratch/cache",
            "--dry-run",
        ]);
        match cli.command {
            Commands::Cache(args) => assert!(args.dry_run),
            _ => panic!("expected Cache command"),
        }
    }

    #[test]
    fn cli_parses_unlock() {
        let cli = Cli::parse_from(["exoflow", "unlock", "--output", "/data/run"]);
        match cli.command {
            Commands::Unlock(args) => assert_eq!(args.output, PathBuf::from("/data/run")),
            _ => panic!("expected Unlock command"),
        }
    }

    #[test]
    fn cli_parses_run_init() {
        let cli = Cli::parse_from([
            "exoflow",
            "run",
            "--runmode",
            "init",
            "--input",
            "a.R1.fastq.gz",
            "a.R2.fastq.gz",
            "--output",
            "/data/run",
            "--genome",
            "hg38",
        ]);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.runmode, RunMode::Init);
                assert_eq!(args.input.len(), 2);
                assert_eq!(args.genome, "hg38");
                assert_eq!(args.mode, ExecMode::Slurm);
                assert_eq!(args.threads, 2);
                assert_eq!(args.job_name, "pl:exoflow");
            }
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn cli_run_default_callers() {
        let cli = Cli::parse_from([
            "exoflow", "run", "--runmode", "run", "--input", "a.bam", "--output", "/o",
            "--genome", "mm10",
        ]);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.callers.len(), 5);
                assert!(args.callers.contains(&Caller::Varscan));
            }
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn cli_run_explicit_callers() {
        let cli = Cli::parse_from([
            "exoflow", "run", "--runmode", "run", "--input", "a.bam", "--output", "/o",
            "--genome", "hg38", "--callers", "mutect2", "strelka",
        ]);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.callers, vec![Caller::Mutect2, Caller::Strelka]);
            }
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn cli_run_requires_runmode() {
        let result = Cli::try_parse_from([
            "exoflow", "run", "--input", "a.bam", "--output", "/o", "--genome", "hg38",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_run_local_mode_with_wait() {
        let cli = Cli::parse_from([
            "exoflow", "run", "--runmode", "run", "--input", "a.bam", "--output", "/o",
            "--genome", "hg38", "--mode", "local", "--wait", "--silent",
        ]);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.mode, ExecMode::Local);
                assert!(args.wait);
                assert!(args.silent);
            }
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn cli_verbose_levels() {
        let cli = Cli::parse_from(["exoflow", "-v", "unlock", "--output", "/o"]);
        assert_eq!(cli.verbose, 1);

        let cli = Cli::parse_from(["exoflow", "-vv", "unlock", "--output", "/o"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn caller_display_matches_value_enum() {
        assert_eq!(Caller::Mutect2.to_string(), "mutect2");
        assert_eq!(Caller::Varscan.to_string(), "varscan");
    }
}
