//! `mixci run` — Run the pipeline and print the test output.

use std::time::Instant;

use clap::Args;
use mixci_pipeline::backend::dagger::DaggerBackend;
use mixci_pipeline::runner::Pipeline;

use super::PipelineArgs;
use crate::output::format_elapsed;

/// Arguments for the `run` command.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Pipeline selection.
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Skip the source-tree and container-runtime checks.
    #[arg(long)]
    pub skip_preflight: bool,
}

/// Executes the `run` command.
///
/// Prints the captured stream of the test command to stdout on success.
///
/// # Errors
///
/// Returns the first failure: preflight, connection, or any step.
pub async fn execute(args: RunArgs) -> anyhow::Result<()> {
    let start = Instant::now();
    let pipeline = Pipeline::new(args.pipeline.into_config(args.skip_preflight))?;
    let output = pipeline.run(&DaggerBackend::new()).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{output}");
    }
    tracing::info!(
        variant = %pipeline.plan().variant,
        elapsed = %format_elapsed(start.elapsed()),
        "done"
    );
    Ok(())
}
