//! `sdkup update`

use sdkup_core::{Manager, RefreshOutcome};
use serde_json::json;
use tracing::instrument;

use super::Output;
use crate::cli::CliError;

/// Refresh the cached candidate list and report what changed.
///
/// Unlike the refresh before an install, a failure here is an error.
///
/// # Errors
///
/// Returns the catalog or I/O error that stopped the refresh.
#[instrument(skip(manager))]
pub async fn execute(manager: &Manager) -> Result<Output, CliError> {
    match manager.refresh().await {
        RefreshOutcome::Failed(err) => Err(err.into()),
        RefreshOutcome::Unchanged => Ok(Output::new(
            "No new candidates found at this time.",
            json!({ "added": [], "removed": [] }),
        )),
        RefreshOutcome::Updated { added, removed } => Ok(render_changes(&added, &removed)),
    }
}

fn render_changes(added: &[String], removed: &[String]) -> Output {
    let mut lines = Vec::new();
    if !added.is_empty() {
        lines.push(format!("Adding new candidates: {}", added.join(", ")));
    }
    if !removed.is_empty() {
        lines.push(format!("Removing obsolete candidates: {}", removed.join(", ")));
    }
    if lines.is_empty() {
        lines.push("No new candidates found at this time.".to_string());
    }
    Output::new(
        lines.join("\n"),
        json!({ "added": added, "removed": removed }),
    )
}
