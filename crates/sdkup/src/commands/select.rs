//! `sdkup use <candidate>@<version>`

use sdkup_core::{Manager, Sdk};
use serde_json::json;
use tracing::instrument;

use super::Output;
use crate::cli::CliError;

/// Make an installed version current.
///
/// # Errors
///
/// Returns an error if the candidate is unknown, the version is missing or not
/// installed, or the link cannot be switched.
#[instrument(skip(manager))]
pub fn execute(manager: &Manager, target: &str) -> Result<Output, CliError> {
    let sdk = Sdk::parse(target)?;
    manager.use_version(&sdk)?;
    Ok(Output::new(
        format!("Using {} {}", sdk.candidate, sdk.version),
        json!({ "candidate": sdk.candidate, "version": sdk.version }),
    ))
}
