//! `sdkup list [candidate]`

use sdkup_core::{Manager, VersionEntry};
use serde_json::json;
use tracing::instrument;

use super::Output;
use crate::cli::CliError;

/// List catalog candidates, or the versions of `candidate` with local markers.
///
/// # Errors
///
/// Returns an error for unknown candidates or when the catalog is unreachable.
#[instrument(skip(manager))]
pub async fn execute(manager: &Manager, candidate: Option<&str>) -> Result<Output, CliError> {
    match candidate {
        None => {
            let candidates = manager.list_candidates().await?;
            Ok(Output::new(candidates.join("\n"), json!(candidates)))
        }
        Some(candidate) => {
            let entries = manager.list_versions(candidate).await?;
            Ok(render_versions(&entries))
        }
    }
}

/// One line per version: `>` marks current, `*` marks installed.
fn render_versions(entries: &[VersionEntry]) -> Output {
    let text = entries
        .iter()
        .map(|entry| {
            let current = if entry.current { '>' } else { ' ' };
            let installed = if entry.installed { '*' } else { ' ' };
            format!("{current} {installed} {}", entry.version)
        })
        .collect::<Vec<_>>()
        .join("\n");
    let data = entries
        .iter()
        .map(|entry| {
            json!({
                "version": entry.version,
                "installed": entry.installed,
                "current": entry.current,
                "available": entry.available,
            })
        })
        .collect();
    Output::new(text, serde_json::Value::Array(data))
}
