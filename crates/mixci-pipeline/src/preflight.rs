//! Host checks run before connecting to the engine.

use std::path::{Path, PathBuf};

use mixci_common::config::PipelineConfig;
use mixci_common::constants::{CONTAINER_RUNTIMES, RUNNER_HOST_VAR};
use mixci_common::error::{CiError, Result};

/// Verifies the source tree exists and the engine has somewhere to run.
///
/// The runtime check is skipped when the engine's runner host is set,
/// since the engine then does not provision itself locally.
///
/// # Errors
///
/// Returns [`CiError::NotFound`] for a missing source directory or when no
/// container runtime is on `PATH`.
pub fn preflight(config: &PipelineConfig) -> Result<()> {
    if config.skip_preflight {
        tracing::debug!("preflight checks skipped");
        return Ok(());
    }

    check_source_dir(&config.source_dir)?;

    if std::env::var_os(RUNNER_HOST_VAR).is_some() {
        tracing::debug!(var = RUNNER_HOST_VAR, "remote engine configured");
        return Ok(());
    }
    let runtime = find_container_runtime()?;
    tracing::debug!(runtime = %runtime.display(), "container runtime found");
    Ok(())
}

/// Fails unless `dir` is an existing directory.
///
/// # Errors
///
/// Returns [`CiError::NotFound`] otherwise.
pub fn check_source_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(CiError::NotFound {
            kind: "source directory",
            id: dir.display().to_string(),
        })
    }
}

/// Finds the first supported container runtime on `PATH`.
///
/// # Errors
///
/// Returns [`CiError::NotFound`] if none is installed.
pub fn find_container_runtime() -> Result<PathBuf> {
    CONTAINER_RUNTIMES
        .iter()
        .find_map(|binary| which::which(binary).ok())
        .ok_or_else(|| CiError::NotFound {
            kind: "container runtime",
            id: format!(
                "{} (install one, or set {RUNNER_HOST_VAR})",
                CONTAINER_RUNTIMES.join(", ")
            ),
        })
}
