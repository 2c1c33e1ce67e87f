//! Unified error type for the mixci workspace.
//!
//! Every variant is fatal to a pipeline run. The variants only exist so
//! the message printed on abort says which stage failed.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum CiError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// The resolved pipeline plan is inconsistent.
    #[error("invalid pipeline plan: {message}")]
    InvalidPlan {
        /// Description of the inconsistency.
        message: String,
    },

    /// The toolchain manifest could not be read.
    #[error("toolchain file {path}: {message}")]
    Toolchain {
        /// Path of the manifest.
        path: PathBuf,
        /// Description of the problem.
        message: String,
    },

    /// Connecting to the orchestration engine failed.
    #[error("failed to connect to engine: {message}")]
    Connect {
        /// Engine-reported reason.
        message: String,
    },

    /// The engine rejected a container or volume declaration.
    #[error("engine error: {message}")]
    Engine {
        /// Engine-reported reason.
        message: String,
    },

    /// A command inside the application container failed.
    #[error("step `{step}` failed: {message}")]
    Exec {
        /// The command line of the failing step.
        step: String,
        /// Engine-reported reason, including command output.
        message: String,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, CiError>;
