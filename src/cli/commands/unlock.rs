//! Unlock command - reconcile a previous run's lock state
//!
//! If the workflow engine dies ungracefully it can leave the run
//! directory locked. Unlocking is idempotent; the operator is
//! responsible for verifying the pipeline is not still running.

use crate::cli::args::UnlockArgs;
use crate::engine;
use crate::error::ExoflowResult;
use crate::paths;
use console::style;

/// Execute the unlock command
pub async fn execute(args: UnlockArgs) -> ExoflowResult<()> {
    let run_dir = paths::require_dir(&args.output)?;

    println!("Unlocking the pipeline's working directory...");
    engine::unlock(&run_dir).await?;

    println!(
        "{} Unlocked {}",
        style("✓").green(),
        run_dir.display()
    );
    Ok(())
}
