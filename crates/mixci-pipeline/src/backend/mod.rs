//! Pipeline execution backends.
//!
//! Both backends walk the same [`EngineCall`] sequence from [`calls`], so
//! the rendered plan and the executed plan cannot disagree on order.

pub mod dagger;
pub mod dry_run;

use std::future::Future;

use mixci_common::error::{CiError, Result};
use mixci_common::types::{CacheMount, EnvVar, ExecStep, OutputStream};

use crate::plan::{PipelinePlan, ServiceSpec, SourceMount};

/// Something that can carry out a [`PipelinePlan`].
///
/// Implementors translate the plan in its fixed order and return the
/// captured output stream of the test step.
pub trait PipelineBackend {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Runs the plan to completion.
    ///
    /// # Errors
    ///
    /// Returns an error on the first failing step; nothing after it runs.
    fn run(&self, plan: &PipelinePlan) -> impl Future<Output = Result<String>>;
}

/// One engine operation of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCall<'a> {
    /// Declare the service container, pull it, and turn it into a service.
    Service(&'a ServiceSpec),
    /// Start the application container from an image.
    From(&'a str),
    /// Upload the source tree.
    MountSource(&'a SourceMount),
    /// Bind the declared service under its alias.
    BindService(&'a str),
    /// Set an application environment variable.
    Env(&'a EnvVar),
    /// Set the working directory.
    Workdir(&'a str),
    /// Mount a cache volume.
    MountCache(&'a CacheMount),
    /// Evaluate everything declared so far, before any command runs.
    Resolve,
    /// Run a setup command and wait for it.
    Exec(&'a ExecStep),
    /// Run the test command and read one of its streams.
    Capture(&'a ExecStep, OutputStream),
}

impl EngineCall<'_> {
    /// Wraps an engine failure of this call in the matching error.
    ///
    /// Commands fail as [`CiError::Exec`]; declarations, pulls, and uploads
    /// fail as [`CiError::Engine`].
    #[must_use]
    pub fn failure(&self, message: impl Into<String>) -> CiError {
        match self {
            Self::Exec(step) | Self::Capture(step, _) => CiError::Exec {
                step: step.display(),
                message: message.into(),
            },
            _ => CiError::Engine {
                message: message.into(),
            },
        }
    }
}

/// The engine calls of a plan, in execution order.
#[must_use]
pub fn calls(plan: &PipelinePlan) -> Vec<EngineCall<'_>> {
    let mut calls = vec![
        EngineCall::Service(&plan.database),
        EngineCall::From(&plan.app_image),
        EngineCall::MountSource(&plan.source),
        EngineCall::BindService(&plan.database.alias),
    ];
    calls.extend(plan.env.iter().map(EngineCall::Env));
    calls.push(EngineCall::Workdir(&plan.workdir));
    calls.extend(plan.caches.iter().map(EngineCall::MountCache));
    calls.push(EngineCall::Resolve);
    calls.extend(plan.setup.iter().map(EngineCall::Exec));
    calls.push(EngineCall::Capture(&plan.test, plan.capture));
    calls
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use mixci_common::types::Variant;

    use super::*;

    fn index_of(calls: &[EngineCall<'_>], pred: impl Fn(&EngineCall<'_>) -> bool) -> usize {
        calls.iter().position(pred).unwrap()
    }

    #[test]
    fn calls_follow_pipeline_order() {
        let plan = PipelinePlan::builder(Variant::Standard).build().unwrap();
        let calls = calls(&plan);

        let service = index_of(&calls, |c| matches!(c, EngineCall::Service(_)));
        let binding = index_of(&calls, |c| matches!(c, EngineCall::BindService(_)));
        let env = index_of(&calls, |c| matches!(c, EngineCall::Env(_)));
        let workdir = index_of(&calls, |c| matches!(c, EngineCall::Workdir(_)));
        let cache = index_of(&calls, |c| matches!(c, EngineCall::MountCache(_)));
        let resolve = index_of(&calls, |c| matches!(c, EngineCall::Resolve));
        let exec = index_of(&calls, |c| matches!(c, EngineCall::Exec(_)));

        assert!(service < binding);
        assert!(binding < env);
        assert!(env < workdir);
        assert!(workdir < cache);
        assert!(cache < resolve);
        assert!(resolve < exec);
        assert!(matches!(
            calls.last(),
            Some(EngineCall::Capture(step, OutputStream::Stderr)) if step.display() == "mix test"
        ));
    }

    #[test]
    fn resolve_follows_last_cache_mount() {
        let plan = PipelinePlan::builder(Variant::Precompiled).build().unwrap();
        let calls = calls(&plan);
        let last_cache = calls
            .iter()
            .rposition(|c| matches!(c, EngineCall::MountCache(_)))
            .unwrap();
        assert_eq!(calls[last_cache + 1], EngineCall::Resolve);
        assert_eq!(
            calls.iter().filter(|c| matches!(c, EngineCall::Exec(_))).count(),
            plan.setup.len()
        );
    }

    #[test]
    fn image_pull_failure_is_engine_error() {
        let err = EngineCall::Resolve.failure("failed to resolve image hexpm/elixir:bad");
        assert!(matches!(err, CiError::Engine { message } if message.contains("hexpm/elixir:bad")));

        let service = ServiceSpec::postgres();
        assert!(matches!(
            EngineCall::Service(&service).failure("pull denied"),
            CiError::Engine { .. }
        ));
    }

    #[test]
    fn command_failure_names_the_step() {
        let step = ExecStep::new(["mix", "deps.get"]);
        let err = EngineCall::Exec(&step).failure("exit code 1");
        assert!(matches!(err, CiError::Exec { step, .. } if step == "mix deps.get"));

        let test = ExecStep::new(["mix", "test"]);
        let err = EngineCall::Capture(&test, OutputStream::Stdout).failure("exit code 2");
        assert!(matches!(err, CiError::Exec { step, .. } if step == "mix test"));
    }
}
