//! `sdkup current [candidate]`

use sdkup_core::{Manager, Sdk};
use serde_json::json;

use super::Output;
use crate::cli::CliError;

/// Show the current version of one candidate, or of all of them.
///
/// # Errors
///
/// Returns `NoCurrent` for a candidate without a current version and
/// `NothingInUse` when no candidate has one.
pub fn execute(manager: &Manager, candidate: Option<&str>) -> Result<Output, CliError> {
    let sdks = match candidate {
        Some(candidate) => vec![manager.current(candidate)?],
        None => manager.current_all()?,
    };
    Ok(render(&sdks))
}

fn render(sdks: &[Sdk]) -> Output {
    let text = sdks
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    let data = sdks
        .iter()
        .map(|sdk| json!({ "candidate": sdk.candidate, "version": sdk.version }))
        .collect();
    Output::new(text, serde_json::Value::Array(data))
}
