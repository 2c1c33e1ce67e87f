//! `mixci variants` — List the pipeline presets.

use mixci_common::types::{ExecStep, Variant};
use mixci_pipeline::variant;

use crate::output::join_or_dash;

/// Executes the `variants` command.
#[allow(clippy::print_stdout)]
pub fn execute() {
    let test = variant::test_step();
    for v in Variant::ALL {
        let caches = variant::caches(v);
        let mut steps = variant::setup_steps(v);
        steps.push(test.clone());

        println!("{v}");
        println!("    caches: {}", join_or_dash(caches.iter().map(|c| c.key.as_str())));
        println!("    steps:  {}", join_or_dash(steps.iter().map(ExecStep::display)));
    }
}
