//! exoflow - whole-exome pipeline driver
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use exoflow::cli::{Cli, Commands};
use exoflow::config::PipelineBase;
use exoflow::error::ExoflowResult;
use exoflow::scheduler::ClusterProfile;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> ExoflowResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("exoflow=warn"),
        1 => EnvFilter::new("exoflow=info"),
        _ => EnvFilter::new("exoflow=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    // Unlock only touches the run directory; no pipeline base needed
    if let Commands::Unlock(args) = cli.command {
        return exoflow::cli::commands::unlock(args).await;
    }

    let base = PipelineBase::resolve()?;
    debug!("Pipeline base: {}", base.root().display());

    match cli.command {
        Commands::Unlock(_) => unreachable!("Unlock handled above"),
        Commands::Cache(args) => exoflow::cli::commands::cache(args, &base).await,
        Commands::Run(args) => {
            // Probed once per process; components receive the value
            let profile = ClusterProfile::detect().await;
            exoflow::cli::commands::run(args, &base, profile).await
        }
    }
}
