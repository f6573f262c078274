//! `sdkup install <candidate>[@<version>]`

use sdkup_core::{Installation, Manager, RefreshOutcome, Sdk};
use serde_json::json;
use tracing::{instrument, warn};

use super::Output;
use crate::cli::CliError;

/// Resolve, install and switch to `target`.
///
/// # Errors
///
/// Returns any error of the install pipeline.
#[instrument(skip(manager))]
pub async fn execute(manager: &Manager, target: &str) -> Result<Output, CliError> {
    let sdk = Sdk::parse(target)?;
    let installation = manager.install(&sdk).await?;
    if let RefreshOutcome::Failed(err) = &installation.refresh {
        warn!(error = %err, "Continued with the cached candidate list");
    }
    Ok(render(&installation))
}

fn render(installation: &Installation) -> Output {
    let Installation { sdk, path, .. } = installation;
    let text = format!(
        "Installed {} {}\nUsing {} {}",
        sdk.candidate, sdk.version, sdk.candidate, sdk.version
    );
    Output::new(
        text,
        json!({
            "candidate": sdk.candidate,
            "version": sdk.version,
            "path": path,
            "current": true,
        }),
    )
}
