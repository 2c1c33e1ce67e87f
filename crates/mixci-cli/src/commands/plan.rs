//! `mixci plan` — Show what a run would do, without connecting.

use clap::Args;
use mixci_pipeline::backend::PipelineBackend;
use mixci_pipeline::backend::dry_run::DryRunBackend;
use mixci_pipeline::runner::Pipeline;

use super::PipelineArgs;

/// Arguments for the `plan` command.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Pipeline selection.
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Print the resolved plan as JSON instead of engine calls.
    #[arg(long)]
    pub json: bool,
}

/// Executes the `plan` command.
///
/// # Errors
///
/// Returns an error if the plan cannot be resolved.
pub async fn execute(args: PlanArgs) -> anyhow::Result<()> {
    let pipeline = Pipeline::new(args.pipeline.into_config(true))?;

    let rendered = if args.json {
        serde_json::to_string_pretty(pipeline.plan())?
    } else {
        DryRunBackend::new().run(pipeline.plan()).await?
    };

    #[allow(clippy::print_stdout)]
    {
        println!("{rendered}");
    }
    Ok(())
}
