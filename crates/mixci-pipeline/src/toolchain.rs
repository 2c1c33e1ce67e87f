//! Elixir/Erlang version selection from a `.mise.toml` manifest.
//!
//! The `[tools]` table pins the versions the project is developed against;
//! the application image is derived from them so CI runs the same runtime.

use std::path::{Path, PathBuf};

use mixci_common::constants::{
    APP_IMAGE_REPOSITORY, DEBIAN_RELEASE, DEFAULT_ELIXIR_VERSION, DEFAULT_ERLANG_VERSION,
    TOOLCHAIN_FILE,
};
use mixci_common::error::{CiError, Result};

/// Elixir and Erlang/OTP versions of the application image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    /// Elixir version, e.g. `1.15.2`.
    pub elixir: String,
    /// Erlang/OTP version, e.g. `26.0.2`.
    pub erlang: String,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            elixir: DEFAULT_ELIXIR_VERSION.to_string(),
            erlang: DEFAULT_ERLANG_VERSION.to_string(),
        }
    }
}

impl Toolchain {
    /// Reads versions from a manifest. Tools it does not pin keep defaults.
    ///
    /// # Errors
    ///
    /// Returns [`CiError::Io`] if the file cannot be read and
    /// [`CiError::Toolchain`] if it is not valid TOML or a tool entry has an
    /// unsupported shape.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CiError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content).map_err(|message| CiError::Toolchain {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Finds the manifest in `source_dir` or its parent and loads it.
    /// Without a manifest the defaults are returned.
    ///
    /// # Errors
    ///
    /// Returns an error if a manifest exists but cannot be loaded.
    pub fn discover(source_dir: &Path) -> Result<Self> {
        match find_manifest(source_dir) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "reading toolchain manifest");
                Self::load(&path)
            }
            None => {
                tracing::debug!(
                    source = %source_dir.display(),
                    "no toolchain manifest, using default versions"
                );
                Ok(Self::default())
            }
        }
    }

    /// Image reference of the application base image.
    #[must_use]
    pub fn image(&self) -> String {
        format!(
            "{APP_IMAGE_REPOSITORY}:{}-erlang-{}-debian-{DEBIAN_RELEASE}",
            self.elixir, self.erlang
        )
    }

    fn parse(content: &str) -> std::result::Result<Self, String> {
        let table: toml::Table = toml::from_str(content).map_err(|e| e.to_string())?;
        let mut toolchain = Self::default();

        let Some(tools) = table.get("tools") else {
            return Ok(toolchain);
        };
        let tools = tools
            .as_table()
            .ok_or_else(|| "`tools` is not a table".to_string())?;

        if let Some(value) = tools.get("elixir") {
            toolchain.elixir = strip_otp_suffix(&tool_version("elixir", value)?).to_string();
        }
        if let Some(value) = tools.get("erlang") {
            toolchain.erlang = tool_version("erlang", value)?;
        }
        Ok(toolchain)
    }
}

fn find_manifest(source_dir: &Path) -> Option<PathBuf> {
    let parent = source_dir.parent().map(|p| {
        if p.as_os_str().is_empty() {
            Path::new(".")
        } else {
            p
        }
    });
    std::iter::once(source_dir)
        .chain(parent)
        .map(|dir| dir.join(TOOLCHAIN_FILE))
        .find(|candidate| candidate.is_file())
}

/// Accepts `"1.2.3"`, `["1.2.3", ...]`, and `{ version = "1.2.3" }`.
fn tool_version(tool: &str, value: &toml::Value) -> std::result::Result<String, String> {
    let version = match value {
        toml::Value::String(s) => Some(s.as_str()),
        toml::Value::Array(items) => items.first().and_then(toml::Value::as_str),
        toml::Value::Table(t) => t.get("version").and_then(toml::Value::as_str),
        _ => None,
    };
    match version.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(format!("unsupported version entry for `{tool}`: {value}")),
    }
}

/// `1.15.2-otp-26` -> `1.15.2`.
fn strip_otp_suffix(version: &str) -> &str {
    version
        .find("-otp-")
        .map_or(version, |idx| &version[..idx])
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn default_image_is_pinned_tag() {
        assert_eq!(
            Toolchain::default().image(),
            "hexpm/elixir:1.15.2-erlang-26.0.2-debian-bookworm-20230612-slim"
        );
    }

    #[test]
    fn parses_string_entries() {
        let tc = Toolchain::parse("[tools]\nelixir = \"1.16.0\"\nerlang = \"26.2.1\"\n").unwrap();
        assert_eq!(tc.elixir, "1.16.0");
        assert_eq!(tc.erlang, "26.2.1");
    }

    #[test]
    fn strips_otp_suffix_from_elixir() {
        let tc = Toolchain::parse("[tools]\nelixir = \"1.15.2-otp-26\"\n").unwrap();
        assert_eq!(tc.elixir, "1.15.2");
        assert_eq!(tc.erlang, DEFAULT_ERLANG_VERSION);
    }

    #[test]
    fn array_entry_uses_first_version() {
        let tc = Toolchain::parse("[tools]\nerlang = [\"25.3\", \"26.0.2\"]\n").unwrap();
        assert_eq!(tc.erlang, "25.3");
    }

    #[test]
    fn table_entry_uses_version_key() {
        let tc = Toolchain::parse("[tools.elixir]\nversion = \"1.14.5\"\n").unwrap();
        assert_eq!(tc.elixir, "1.14.5");
    }

    #[test]
    fn missing_tools_table_keeps_defaults() {
        let tc = Toolchain::parse("[env]\nFOO = \"bar\"\n").unwrap();
        assert_eq!(tc, Toolchain::default());
    }

    #[test]
    fn numeric_entry_is_rejected() {
        assert!(Toolchain::parse("[tools]\nelixir = 1\n").is_err());
    }

    #[test]
    fn invalid_toml_is_rejected() {
        assert!(Toolchain::parse("[tools\nelixir = ").is_err());
    }
}
