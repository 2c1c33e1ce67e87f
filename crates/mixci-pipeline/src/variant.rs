//! Cache volumes and setup steps of each pipeline preset.

use mixci_common::constants::{BUILD_CACHE, BUILD_CACHE_PATH, DEPS_CACHE, DEPS_CACHE_PATH};
use mixci_common::types::{CacheMount, ExecStep, Variant};

/// Cache volumes attached by the given preset.
#[must_use]
pub fn caches(variant: Variant) -> Vec<CacheMount> {
    let deps = CacheMount::new(DEPS_CACHE, DEPS_CACHE_PATH);
    match variant {
        Variant::Standard | Variant::Precompiled => {
            vec![deps, CacheMount::new(BUILD_CACHE, BUILD_CACHE_PATH)]
        }
        Variant::SingleCache => vec![deps],
    }
}

/// Commands run before the test step, in order.
#[must_use]
pub fn setup_steps(variant: Variant) -> Vec<ExecStep> {
    let hex = ExecStep::new(["mix", "local.hex", "--force"]);
    let deps_get = ExecStep::new(["mix", "deps.get"]);
    match variant {
        Variant::Standard | Variant::SingleCache => vec![hex, deps_get],
        Variant::Precompiled => vec![
            hex,
            ExecStep::new(["mix", "local.rebar", "--force"]),
            deps_get,
            ExecStep::new(["mix", "deps.compile"]),
        ],
    }
}

/// The test command shared by every preset.
#[must_use]
pub fn test_step() -> ExecStep {
    ExecStep::new(["mix", "test"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_mounts_deps_and_build() {
        let paths: Vec<_> = caches(Variant::Standard).into_iter().map(|c| c.path).collect();
        assert_eq!(paths, ["/app/deps", "/app/_build"]);
    }

    #[test]
    fn single_cache_mounts_deps_only() {
        let keys: Vec<_> = caches(Variant::SingleCache).into_iter().map(|c| c.key).collect();
        assert_eq!(keys, ["deps"]);
    }

    #[test]
    fn precompiled_compiles_after_fetch() {
        let steps: Vec<_> = setup_steps(Variant::Precompiled)
            .iter()
            .map(ExecStep::display)
            .collect();
        assert_eq!(
            steps,
            [
                "mix local.hex --force",
                "mix local.rebar --force",
                "mix deps.get",
                "mix deps.compile",
            ]
        );
    }

    #[test]
    fn every_preset_bootstraps_hex_first() {
        for variant in Variant::ALL {
            let first = setup_steps(variant).into_iter().next().map(|s| s.display());
            assert_eq!(first.as_deref(), Some("mix local.hex --force"));
        }
    }
}
