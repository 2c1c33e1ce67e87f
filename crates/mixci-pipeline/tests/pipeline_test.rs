//! Integration tests for pipeline resolution and execution.
//!
//! Covers:
//! 1. Toolchain discovery from a `.mise.toml` beside or above the source tree
//! 2. Plan resolution for every preset
//! 3. Running through a backend: output pass-through and fail-fast errors
//! 4. Preflight rejection of a missing source tree

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::path::Path;
use std::sync::Mutex;

use mixci_common::config::PipelineConfig;
use mixci_common::error::{CiError, Result};
use mixci_common::types::{OutputStream, Variant};
use mixci_pipeline::backend::PipelineBackend;
use mixci_pipeline::plan::PipelinePlan;
use mixci_pipeline::runner::Pipeline;
use mixci_pipeline::toolchain::Toolchain;

/// Records every plan it is given and replies with a canned outcome.
struct RecordingBackend {
    seen: Mutex<Vec<PipelinePlan>>,
    fail_step: Option<String>,
}

impl RecordingBackend {
    fn passing() -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
            fail_step: None,
        }
    }

    fn failing_at(step: &str) -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
            fail_step: Some(step.to_string()),
        }
    }

    fn runs(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

impl PipelineBackend for RecordingBackend {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn run(&self, plan: &PipelinePlan) -> Result<String> {
        self.seen.lock().unwrap().push(plan.clone());
        for step in plan.steps() {
            if self.fail_step.as_deref() == Some(step.display().as_str()) {
                return Err(CiError::Exec {
                    step: step.display(),
                    message: "exit code 1".to_string(),
                });
            }
        }
        Ok(format!("{} tests, 0 failures", plan.steps().count()))
    }
}

fn source_tree(mise: Option<&str>) -> tempfile::TempDir {
    let root = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir(root.path().join("app")).expect("app dir");
    std::fs::write(root.path().join("app/mix.exs"), "defmodule App.MixProject do\nend\n")
        .expect("mix.exs");
    if let Some(content) = mise {
        std::fs::write(root.path().join(".mise.toml"), content).expect(".mise.toml");
    }
    root
}

fn config_for(root: &Path) -> PipelineConfig {
    PipelineConfig {
        source_dir: root.join("app"),
        skip_preflight: true,
        ..PipelineConfig::default()
    }
}

// ── Toolchain ────────────────────────────────────────────────────────

#[test]
fn manifest_in_parent_selects_image() {
    let root = source_tree(Some("[tools]\nelixir = \"1.16.1-otp-26\"\nerlang = \"26.2.2\"\n"));
    let pipeline = Pipeline::new(config_for(root.path())).unwrap();
    assert_eq!(
        pipeline.plan().app_image,
        "hexpm/elixir:1.16.1-erlang-26.2.2-debian-bookworm-20230612-slim"
    );
}

#[test]
fn manifest_in_source_dir_takes_precedence() {
    let root = source_tree(Some("[tools]\nelixir = \"1.14.0\"\n"));
    std::fs::write(root.path().join("app/.mise.toml"), "[tools]\nelixir = \"1.17.0\"\n").unwrap();
    let toolchain = Toolchain::discover(&root.path().join("app")).unwrap();
    assert_eq!(toolchain.elixir, "1.17.0");
}

#[test]
fn no_manifest_uses_default_image() {
    let root = source_tree(None);
    let pipeline = Pipeline::new(config_for(root.path())).unwrap();
    assert_eq!(pipeline.plan().app_image, Toolchain::default().image());
}

#[test]
fn malformed_manifest_aborts() {
    let root = source_tree(Some("[tools]\nelixir = 1.15\n"));
    let err = Pipeline::new(config_for(root.path()));
    assert!(matches!(err, Err(CiError::Toolchain { .. })));
}

// ── Plans ────────────────────────────────────────────────────────────

#[test]
fn every_preset_resolves_with_shared_service_and_test() {
    let root = source_tree(None);
    for variant in Variant::ALL {
        let config = PipelineConfig {
            variant,
            ..config_for(root.path())
        };
        let plan = Pipeline::new(config).unwrap().plan().clone();
        assert_eq!(plan.database.alias, "db");
        assert_eq!(plan.test.display(), "mix test");
        assert!(!plan.caches.is_empty() && plan.caches.len() <= 2);
    }
}

#[test]
fn plan_serializes_to_json() {
    let plan = PipelinePlan::builder(Variant::Standard).build().unwrap();
    let json = serde_json::to_value(&plan).unwrap();
    assert_eq!(json["variant"], "standard");
    assert_eq!(json["capture"], "stderr");
    assert_eq!(json["database"]["port"], 5432);
}

// ── Execution ────────────────────────────────────────────────────────

#[tokio::test]
async fn passing_run_returns_backend_output() {
    let root = source_tree(None);
    let pipeline = Pipeline::new(config_for(root.path())).unwrap();
    let backend = RecordingBackend::passing();

    let out = pipeline.run(&backend).await.unwrap();
    assert_eq!(out, "3 tests, 0 failures");
    assert_eq!(backend.runs(), 1);
}

#[tokio::test]
async fn failing_step_surfaces_as_exec_error() {
    let root = source_tree(None);
    let pipeline = Pipeline::new(config_for(root.path())).unwrap();
    let backend = RecordingBackend::failing_at("mix deps.get");

    let err = pipeline.run(&backend).await.unwrap_err();
    match err {
        CiError::Exec { step, .. } => assert_eq!(step, "mix deps.get"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn capture_choice_reaches_backend() {
    let root = source_tree(None);
    let config = PipelineConfig {
        capture: OutputStream::Stdout,
        ..config_for(root.path())
    };
    let pipeline = Pipeline::new(config).unwrap();
    let backend = RecordingBackend::passing();
    let _ = pipeline.run(&backend).await.unwrap();

    let seen = backend.seen.lock().unwrap();
    assert_eq!(seen[0].capture, OutputStream::Stdout);
}

#[tokio::test]
async fn missing_source_never_reaches_backend() {
    let root = source_tree(None);
    let config = PipelineConfig {
        source_dir: root.path().join("missing"),
        skip_preflight: false,
        ..PipelineConfig::default()
    };
    let pipeline = Pipeline::new(config).unwrap();
    let backend = RecordingBackend::passing();

    let err = pipeline.run(&backend).await;
    assert!(matches!(err, Err(CiError::NotFound { .. })));
    assert_eq!(backend.runs(), 0);
}
