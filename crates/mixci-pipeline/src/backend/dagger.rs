//! Dagger engine backend.
//!
//! Opens one engine session per run and walks the plan's [`EngineCall`]s.
//! Declarations are lazy in the engine, so the service container and the
//! application container are synced before any command runs; a bad image
//! then fails as an engine error instead of as the first setup step.

use std::sync::Arc;

use dagger_sdk::logging::TracingLogger;
use dagger_sdk::{Config, Container, ContainerWithDirectoryOptsBuilder, Query, Service};
use mixci_common::error::{CiError, Result};
use mixci_common::types::OutputStream;

use super::{EngineCall, PipelineBackend, calls};
use crate::plan::{PipelinePlan, ServiceSpec, SourceMount};

/// Runs plans on a Dagger engine, provisioned by the SDK on first use.
#[derive(Debug, Default, Clone, Copy)]
pub struct DaggerBackend;

impl DaggerBackend {
    /// Creates the backend.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl PipelineBackend for DaggerBackend {
    fn name(&self) -> &'static str {
        "dagger"
    }

    async fn run(&self, plan: &PipelinePlan) -> Result<String> {
        let plan = plan.clone();
        let (tx, rx) = tokio::sync::oneshot::channel();

        tracing::info!("connecting to engine");
        dagger_sdk::connect_opts(session_config(), move |client| async move {
            let outcome = execute(&client, &plan).await;
            let _ = tx.send(outcome);
            Ok(())
        })
        .await
        .map_err(|e| CiError::Connect {
            message: e.to_string(),
        })?;

        rx.await.map_err(|_| CiError::Engine {
            message: "engine session ended before the pipeline finished".into(),
        })?
    }
}

/// Session output goes through tracing so stdout only carries test output.
fn session_config() -> Config {
    Config {
        logger: Some(Arc::new(TracingLogger::default())),
        ..Config::default()
    }
}

async fn execute(client: &Query, plan: &PipelinePlan) -> Result<String> {
    let mut service: Option<Service> = None;
    let mut app: Option<Container> = None;

    for call in calls(plan) {
        match call {
            EngineCall::Service(spec) => service = Some(declare_service(client, spec).await?),
            EngineCall::From(image) => {
                tracing::debug!(image, "declaring application container");
                app = Some(client.container().from(image));
            }
            EngineCall::MountSource(source) => {
                let mounted = mount_source(client, declared(app.take())?, source)?;
                app = Some(mounted);
            }
            EngineCall::BindService(alias) => {
                let bound = service.clone().ok_or_else(|| call.failure("no service declared"))?;
                app = Some(declared(app.take())?.with_service_binding(alias, bound));
            }
            EngineCall::Env(var) => {
                let with_env = declared(app.take())?
                    .with_env_variable(var.key.as_str(), var.value.as_str());
                app = Some(with_env);
            }
            EngineCall::Workdir(dir) => app = Some(declared(app.take())?.with_workdir(dir)),
            EngineCall::MountCache(cache) => {
                tracing::debug!(volume = %cache.key, path = %cache.path, "mounting cache volume");
                app = Some(declared(app.take())?.with_mounted_cache(
                    cache.path.as_str(),
                    client.cache_volume(cache.key.as_str()),
                ));
            }
            EngineCall::Resolve => {
                tracing::info!(image = %plan.app_image, "resolving application container");
                let resolved = declared(app.take())?;
                let _ = resolved.sync().await.map_err(|e| call.failure(e.to_string()))?;
                app = Some(resolved);
            }
            EngineCall::Exec(step) => {
                tracing::info!(step = %step.display(), "running");
                let next = declared(app.take())?.with_exec(step.args.clone());
                let _ = next.sync().await.map_err(|e| call.failure(e.to_string()))?;
                app = Some(next);
            }
            EngineCall::Capture(step, stream) => {
                tracing::info!(step = %step.display(), capture = %stream, "running tests");
                let runner = declared(app.take())?.with_exec(step.args.clone());
                let output = match stream {
                    OutputStream::Stdout => runner.stdout().await,
                    OutputStream::Stderr => runner.stderr().await,
                };
                return output.map_err(|e| call.failure(e.to_string()));
            }
        }
    }

    Err(CiError::Engine {
        message: "plan ended without a test step".into(),
    })
}

fn declared(app: Option<Container>) -> Result<Container> {
    app.ok_or_else(|| CiError::Engine {
        message: "no application container declared".into(),
    })
}

/// Declares the service container and pulls it, so a missing image fails here.
async fn declare_service(client: &Query, spec: &ServiceSpec) -> Result<Service> {
    tracing::debug!(alias = %spec.alias, image = %spec.image, port = spec.port, "declaring service");
    let call = EngineCall::Service(spec);

    let mut container = client.container().from(spec.image.as_str());
    for var in &spec.env {
        container = container.with_env_variable(var.key.as_str(), var.value.as_str());
    }
    let port = spec
        .port
        .try_into()
        .map_err(|_| call.failure(format!("port {} out of range", spec.port)))?;
    let container = container.with_exposed_port(port);

    let _ = container
        .sync()
        .await
        .map_err(|e| call.failure(format!("service `{}`: {e}", spec.alias)))?;
    Ok(container.as_service())
}

fn mount_source(client: &Query, app: Container, source: &SourceMount) -> Result<Container> {
    let host_path = source.host_path.to_string_lossy().into_owned();
    tracing::debug!(source = %host_path, exclude = ?source.exclude, "mounting source tree");

    let exclude: Vec<&str> = source.exclude.iter().map(String::as_str).collect();
    let opts = ContainerWithDirectoryOptsBuilder::default()
        .exclude(exclude)
        .build()
        .map_err(|e| EngineCall::MountSource(source).failure(e.to_string()))?;

    Ok(app.with_directory_opts(
        source.container_path.as_str(),
        client.host().directory(host_path),
        opts,
    ))
}
