//! Backend that renders a plan instead of running it.

use std::fmt::Write as _;

use mixci_common::error::Result;
use mixci_common::types::EnvVar;

use super::{EngineCall, PipelineBackend, calls};
use crate::plan::PipelinePlan;

/// Lists the engine calls a plan would make, in execution order.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunBackend;

impl DryRunBackend {
    /// Creates the backend.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl PipelineBackend for DryRunBackend {
    fn name(&self) -> &'static str {
        "dry-run"
    }

    async fn run(&self, plan: &PipelinePlan) -> Result<String> {
        Ok(render(plan).join("\n"))
    }
}

/// One line per engine call, in the order the Dagger backend issues them.
#[must_use]
pub fn render(plan: &PipelinePlan) -> Vec<String> {
    let mut lines = Vec::new();
    for call in calls(plan) {
        match call {
            EngineCall::Service(spec) => {
                lines.push(format!("{} = container().from({:?})", spec.alias, spec.image));
                lines.extend(spec.env.iter().map(env_line));
                lines.push(format!("  .with_exposed_port({})", spec.port));
                lines.push("  .sync()".to_string());
                lines.push("  .as_service()".to_string());
            }
            EngineCall::From(image) => lines.push(format!("app = container().from({image:?})")),
            EngineCall::MountSource(source) => {
                let mut line = format!(
                    "  .with_directory({:?}, host().directory({:?})",
                    source.container_path,
                    source.host_path.display().to_string()
                );
                if !source.exclude.is_empty() {
                    let _ = write!(line, ", exclude: {:?}", source.exclude);
                }
                line.push(')');
                lines.push(line);
            }
            EngineCall::BindService(alias) => {
                lines.push(format!("  .with_service_binding({alias:?}, {alias})"));
            }
            EngineCall::Env(var) => lines.push(env_line(var)),
            EngineCall::Workdir(dir) => lines.push(format!("  .with_workdir({dir:?})")),
            EngineCall::MountCache(cache) => lines.push(format!(
                "  .with_mounted_cache({:?}, cache_volume({:?}))",
                cache.path, cache.key
            )),
            EngineCall::Resolve => lines.push("  .sync()".to_string()),
            EngineCall::Exec(step) => {
                lines.push(format!("  .with_exec({:?})", step.args));
                lines.push("  .sync()".to_string());
            }
            EngineCall::Capture(step, stream) => {
                lines.push(format!("  .with_exec({:?})", step.args));
                lines.push(format!("  .{stream}()"));
            }
        }
    }
    lines
}

fn env_line(var: &EnvVar) -> String {
    format!("  .with_env_variable({:?}, {:?})", var.key, var.value)
}
