//! # mixci-pipeline
//!
//! Builds and runs the test pipeline for the application:
//! a Postgres service bound into an Elixir container with the source tree
//! mounted, dependencies fetched into cache volumes, and `mix test` run
//! against it.
//!
//! - [`plan`] resolves a run into an engine-independent [`PipelinePlan`](plan::PipelinePlan).
//! - [`variant`] holds the presets' caches and setup steps.
//! - [`toolchain`] picks the base image from `.mise.toml`.
//! - [`backend`] executes a plan on the Dagger engine or renders it.
//! - [`runner`] ties configuration, preflight, and a backend together.
//!
//! # Example
//!
//! ```rust,no_run
//! use mixci_common::config::PipelineConfig;
//! use mixci_pipeline::backend::dagger::DaggerBackend;
//! use mixci_pipeline::runner::Pipeline;
//!
//! # async fn run() -> mixci_common::error::Result<()> {
//! let pipeline = Pipeline::new(PipelineConfig::default())?;
//! let output = pipeline.run(&DaggerBackend::new()).await?;
//! println!("{output}");
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod plan;
pub mod preflight;
pub mod runner;
pub mod toolchain;
pub mod variant;
