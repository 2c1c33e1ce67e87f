//! CLI command definitions and dispatch.

pub mod plan;
pub mod run;
pub mod variants;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use mixci_common::config::PipelineConfig;
use mixci_common::constants::DEFAULT_SOURCE_DIR;
use mixci_common::types::{OutputStream, Variant};

/// mixci — containerized test pipeline for the application.
///
/// Without a subcommand, runs the standard pipeline over `./app`.
#[derive(Parser, Debug)]
#[command(name = "mixci", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the pipeline and print the test output.
    Run(run::RunArgs),
    /// Show the engine calls a run would make, without connecting.
    Plan(plan::PlanArgs),
    /// List the pipeline presets.
    Variants,
}

/// Flags that select and shape a pipeline run.
#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
    /// Pipeline preset: standard, precompiled, or single-cache.
    #[arg(long, default_value_t = Variant::Standard)]
    pub variant: Variant,

    /// Host directory mounted as the source tree.
    #[arg(long, default_value = DEFAULT_SOURCE_DIR)]
    pub source: PathBuf,

    /// Stream of the test command to print: stdout or stderr.
    #[arg(long, default_value_t = OutputStream::Stderr)]
    pub capture: OutputStream,

    /// Application image, overriding the toolchain manifest.
    #[arg(long)]
    pub image: Option<String>,

    /// Toolchain manifest to read instead of discovering `.mise.toml`.
    #[arg(long)]
    pub toolchain: Option<PathBuf>,
}

impl PipelineArgs {
    /// Converts the flags into a pipeline configuration.
    pub fn into_config(self, skip_preflight: bool) -> PipelineConfig {
        PipelineConfig {
            source_dir: self.source,
            variant: self.variant,
            capture: self.capture,
            app_image: self.image,
            toolchain_file: self.toolchain,
            skip_preflight,
        }
    }
}

impl Default for PipelineArgs {
    fn default() -> Self {
        let config = PipelineConfig::default();
        Self {
            variant: config.variant,
            source: config.source_dir,
            capture: config.capture,
            image: config.app_image,
            toolchain: config.toolchain_file,
        }
    }
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub async fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        None => run::execute(run::RunArgs::default()).await,
        Some(Command::Run(args)) => run::execute(args).await,
        Some(Command::Plan(args)) => plan::execute(args).await,
        Some(Command::Variants) => {
            variants::execute();
            Ok(())
        }
    }
}
