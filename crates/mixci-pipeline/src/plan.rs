//! Engine-independent description of one pipeline run.
//!
//! A [`PipelinePlan`] carries every value the backend passes to the engine:
//! images, env, mounts, caches, and commands. Backends translate it in a
//! fixed order: service binding, env injection, workdir, cache mounts,
//! setup steps, test step.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use mixci_common::constants::{
    APP_WORKDIR, DB_ALIAS, DB_HOST_VAR, DB_IMAGE, DB_PASSWORD, DB_PORT, DB_USER,
    DEFAULT_SOURCE_DIR, MIX_ENV_TEST, MIX_ENV_VAR, SOURCE_EXCLUDES,
};
use mixci_common::error::{CiError, Result};
use mixci_common::types::{CacheMount, EnvVar, ExecStep, OutputStream, Variant};

use crate::toolchain::Toolchain;
use crate::variant;

/// A service container bound into the application container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSpec {
    /// Hostname the service is reachable under.
    pub alias: String,
    /// Service image.
    pub image: String,
    /// Service environment.
    pub env: Vec<EnvVar>,
    /// Exposed port.
    pub port: u16,
}

impl ServiceSpec {
    /// The Postgres service with fixed credentials.
    #[must_use]
    pub fn postgres() -> Self {
        Self {
            alias: DB_ALIAS.to_string(),
            image: DB_IMAGE.to_string(),
            env: vec![
                EnvVar::new("POSTGRES_USER", DB_USER),
                EnvVar::new("POSTGRES_PASSWORD", DB_PASSWORD),
            ],
            port: DB_PORT,
        }
    }
}

/// The host source tree mounted into the application container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMount {
    /// Host directory.
    pub host_path: PathBuf,
    /// Mount point inside the container.
    pub container_path: String,
    /// Globs excluded from the upload.
    pub exclude: Vec<String>,
}

/// Fully-resolved pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelinePlan {
    /// Preset the plan was built from.
    pub variant: Variant,
    /// Database service.
    pub database: ServiceSpec,
    /// Application base image.
    pub app_image: String,
    /// Source tree mount.
    pub source: SourceMount,
    /// Working directory of every step.
    pub workdir: String,
    /// Application environment, injected after the service binding.
    pub env: Vec<EnvVar>,
    /// Cache volumes.
    pub caches: Vec<CacheMount>,
    /// Commands run before the test.
    pub setup: Vec<ExecStep>,
    /// The test command.
    pub test: ExecStep,
    /// Stream of the test command to return.
    pub capture: OutputStream,
}

impl PipelinePlan {
    /// Starts a builder seeded from the given preset.
    #[must_use]
    pub fn builder(variant: Variant) -> PlanBuilder {
        PlanBuilder::new(variant)
    }

    /// Setup steps followed by the test step.
    pub fn steps(&self) -> impl Iterator<Item = &ExecStep> {
        self.setup.iter().chain(std::iter::once(&self.test))
    }

    /// Checks the plan for values the engine would reject or misapply.
    ///
    /// # Errors
    ///
    /// Returns [`CiError::InvalidPlan`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.database.alias.trim().is_empty() {
            return Err(invalid("database service alias is empty"));
        }
        if self.database.port == 0 {
            return Err(invalid("database service port is 0"));
        }
        if self.app_image.trim().is_empty() {
            return Err(invalid("application image is empty"));
        }
        if !self.workdir.starts_with('/') {
            return Err(invalid(format!("workdir `{}` is not absolute", self.workdir)));
        }
        if !self.source.container_path.starts_with('/') {
            return Err(invalid(format!(
                "source mount `{}` is not absolute",
                self.source.container_path
            )));
        }

        check_env("database", &self.database.env)?;
        check_env("application", &self.env)?;

        let mut keys = HashSet::new();
        let mut paths = HashSet::new();
        for cache in &self.caches {
            if cache.key.trim().is_empty() {
                return Err(invalid("cache volume name is empty"));
            }
            if !cache.path.starts_with('/') {
                return Err(invalid(format!("cache mount `{}` is not absolute", cache.path)));
            }
            if !keys.insert(cache.key.as_str()) {
                return Err(invalid(format!("cache volume `{}` mounted twice", cache.key)));
            }
            if !paths.insert(cache.path.as_str()) {
                return Err(invalid(format!("two caches mounted at `{}`", cache.path)));
            }
        }

        if let Some(idx) = self.setup.iter().position(ExecStep::is_empty) {
            return Err(invalid(format!("setup step {} has no command", idx + 1)));
        }
        if self.test.is_empty() {
            return Err(invalid("test command is empty"));
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> CiError {
    CiError::InvalidPlan {
        message: message.into(),
    }
}

fn check_env(owner: &str, env: &[EnvVar]) -> Result<()> {
    let mut seen = HashSet::new();
    for var in env {
        if !var.has_valid_key() {
            return Err(invalid(format!("{owner} env key `{}` is invalid", var.key)));
        }
        if !seen.insert(var.key.as_str()) {
            return Err(invalid(format!("{owner} env key `{}` set twice", var.key)));
        }
    }
    Ok(())
}

/// Builder for a [`PipelinePlan`].
#[derive(Debug)]
pub struct PlanBuilder {
    variant: Variant,
    app_image: Option<String>,
    source_dir: PathBuf,
    capture: OutputStream,
    extra_env: Vec<EnvVar>,
}

impl PlanBuilder {
    /// Creates a builder for the given preset with canonical defaults.
    #[must_use]
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            app_image: None,
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            capture: OutputStream::default(),
            extra_env: Vec::new(),
        }
    }

    /// Sets the application base image.
    #[must_use]
    pub fn app_image(mut self, image: impl Into<String>) -> Self {
        self.app_image = Some(image.into());
        self
    }

    /// Sets the host directory mounted as the source tree.
    #[must_use]
    pub fn source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dir = dir.into();
        self
    }

    /// Sets which stream of the test command is returned.
    #[must_use]
    pub const fn capture(mut self, stream: OutputStream) -> Self {
        self.capture = stream;
        self
    }

    /// Adds an application environment variable after the built-in ones.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_env.push(EnvVar::new(key, value));
        self
    }

    /// Builds and validates the plan.
    ///
    /// Without an explicit image the default toolchain's image is used.
    ///
    /// # Errors
    ///
    /// Returns [`CiError::InvalidPlan`] if the result fails validation.
    pub fn build(self) -> Result<PipelinePlan> {
        let database = ServiceSpec::postgres();
        let mut env = vec![
            EnvVar::new(DB_HOST_VAR, database.alias.clone()),
            EnvVar::new(MIX_ENV_VAR, MIX_ENV_TEST),
        ];
        env.extend(self.extra_env);

        let plan = PipelinePlan {
            variant: self.variant,
            database,
            app_image: self
                .app_image
                .unwrap_or_else(|| Toolchain::default().image()),
            source: SourceMount {
                host_path: self.source_dir,
                container_path: APP_WORKDIR.to_string(),
                exclude: SOURCE_EXCLUDES.iter().map(ToString::to_string).collect(),
            },
            workdir: APP_WORKDIR.to_string(),
            env,
            caches: variant::caches(self.variant),
            setup: variant::setup_steps(self.variant),
            test: variant::test_step(),
            capture: self.capture,
        };
        plan.validate()?;
        Ok(plan)
    }
}
