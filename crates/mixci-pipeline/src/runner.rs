//! Resolves a configuration into a plan and runs it through a backend.

use std::time::Instant;

use mixci_common::config::PipelineConfig;
use mixci_common::error::Result;

use crate::backend::PipelineBackend;
use crate::plan::PipelinePlan;
use crate::preflight::preflight;
use crate::toolchain::Toolchain;

/// A configured pipeline, ready to run.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    plan: PipelinePlan,
}

impl Pipeline {
    /// Resolves the plan for `config`.
    ///
    /// The application image comes from, in order: the explicit override,
    /// the explicit toolchain file, a `.mise.toml` next to the source tree,
    /// the default toolchain.
    ///
    /// # Errors
    ///
    /// Returns an error if the toolchain manifest is unreadable or the
    /// resulting plan is invalid.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let image = match (&config.app_image, &config.toolchain_file) {
            (Some(image), _) => image.clone(),
            (None, Some(path)) => Toolchain::load(path)?.image(),
            (None, None) => Toolchain::discover(&config.source_dir)?.image(),
        };

        let plan = PipelinePlan::builder(config.variant)
            .app_image(image)
            .source_dir(config.source_dir.clone())
            .capture(config.capture)
            .build()?;

        Ok(Self { config, plan })
    }

    /// The resolved plan.
    #[must_use]
    pub const fn plan(&self) -> &PipelinePlan {
        &self.plan
    }

    /// The configuration the plan was resolved from.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs preflight checks, then the plan, returning the captured output.
    ///
    /// # Errors
    ///
    /// Returns the first failure; there are no retries.
    pub async fn run<B: PipelineBackend>(&self, backend: &B) -> Result<String> {
        preflight(&self.config)?;

        let start = Instant::now();
        tracing::info!(
            backend = backend.name(),
            variant = %self.plan.variant,
            image = %self.plan.app_image,
            "pipeline started"
        );

        let result = backend.run(&self.plan).await;
        let elapsed = start.elapsed().as_secs_f64();
        match &result {
            Ok(_) => tracing::info!(elapsed_secs = elapsed, "pipeline passed"),
            Err(e) => tracing::error!(elapsed_secs = elapsed, error = %e, "pipeline failed"),
        }
        result
    }
}
