//! `sdkup export [shell]`
//!
//! Prints a script for `eval "$(sdkup export)"`. Nothing is printed when no
//! candidate has a current version.

use sdkup_core::{Manager, Shell};
use serde_json::json;
use tracing::debug;

use super::Output;

/// Render the exports of every current version for `shell`.
#[must_use]
pub fn execute(manager: &Manager, shell: Option<&str>) -> Output {
    let shell = Shell::detect(shell);
    let exports = manager.exports();
    debug!(shell = shell.name(), paths = exports.paths.len(), "Rendering exports");

    let vars: serde_json::Map<String, serde_json::Value> = exports
        .vars
        .iter()
        .map(|(name, path)| (name.clone(), json!(path)))
        .collect();
    Output::new(
        shell.render(&exports),
        json!({
            "shell": shell.name(),
            "paths": exports.paths,
            "vars": vars,
        }),
    )
}
