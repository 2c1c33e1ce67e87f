//! Domain primitive types used across the mixci workspace.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CiError;

/// One of the pipeline presets.
///
/// The presets differ only in cache volumes and setup steps; the database
/// service, source mount, and test command are shared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// Dependency and build caches; fetch dependencies, then test.
    #[default]
    Standard,
    /// Like `Standard`, but also installs rebar and compiles dependencies
    /// before the test step.
    Precompiled,
    /// Dependency cache only; fetch dependencies, then test.
    SingleCache,
}

impl Variant {
    /// All presets, in display order.
    pub const ALL: [Self; 3] = [Self::Standard, Self::Precompiled, Self::SingleCache];

    /// Returns the canonical name of the preset.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Precompiled => "precompiled",
            Self::SingleCache => "single-cache",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = CiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| CiError::Config {
                message: format!(
                    "unknown variant `{s}` (expected one of: standard, precompiled, single-cache)"
                ),
            })
    }
}

/// An environment variable injected into a container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnvVar {
    /// Variable name.
    pub key: String,
    /// Variable value.
    pub value: String,
}

impl EnvVar {
    /// Creates a new environment variable.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Returns `true` if the key can be passed to a container runtime.
    #[must_use]
    pub fn has_valid_key(&self) -> bool {
        !self.key.is_empty() && !self.key.contains('=')
    }
}

impl fmt::Display for EnvVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// An engine-owned cache volume and where it is mounted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheMount {
    /// Cache volume name; the engine persists contents under this key.
    pub key: String,
    /// Absolute mount point inside the container.
    pub path: String,
}

impl CacheMount {
    /// Creates a new cache mount.
    #[must_use]
    pub fn new(key: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            path: path.into(),
        }
    }
}

/// A command executed inside the application container, without a shell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecStep {
    /// Program followed by its arguments.
    pub args: Vec<String>,
}

impl ExecStep {
    /// Creates a step from an argument list.
    #[must_use]
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the command line as it would be typed in a shell.
    #[must_use]
    pub fn display(&self) -> String {
        self.args.join(" ")
    }

    /// Returns `true` if there is no program to run.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.args.first().is_none_or(|program| program.trim().is_empty())
    }
}

/// Output stream of the test command that is captured and printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStream {
    /// Standard output.
    Stdout,
    /// Standard error.
    #[default]
    Stderr,
}

impl fmt::Display for OutputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => write!(f, "stdout"),
            Self::Stderr => write!(f, "stderr"),
        }
    }
}

impl FromStr for OutputStream {
    type Err = CiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdout" => Ok(Self::Stdout),
            "stderr" => Ok(Self::Stderr),
            other => Err(CiError::Config {
                message: format!("unknown output stream `{other}` (expected stdout or stderr)"),
            }),
        }
    }
}
