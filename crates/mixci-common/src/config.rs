//! Pipeline configuration model.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::{OutputStream, Variant};

/// Everything that selects how a pipeline run is assembled.
///
/// The default value reproduces the canonical pipeline: the `standard`
/// preset over `./app`, printing the test command's stderr.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Host directory mounted as the application source tree.
    pub source_dir: PathBuf,
    /// Preset to run.
    pub variant: Variant,
    /// Stream of the test command to print.
    pub capture: OutputStream,
    /// Explicit application image; disables toolchain detection.
    pub app_image: Option<String>,
    /// Explicit toolchain manifest; otherwise discovered next to the source.
    pub toolchain_file: Option<PathBuf>,
    /// Skip host checks before connecting to the engine.
    pub skip_preflight: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(crate::constants::DEFAULT_SOURCE_DIR),
            variant: Variant::default(),
            capture: OutputStream::default(),
            app_image: None,
            toolchain_file: None,
            skip_preflight: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_canonical_pipeline() {
        let config = PipelineConfig::default();
        assert_eq!(config.source_dir, PathBuf::from("app"));
        assert_eq!(config.variant, Variant::Standard);
        assert_eq!(config.capture, OutputStream::Stderr);
        assert!(config.app_image.is_none());
        assert!(!config.skip_preflight);
    }
}
