//! Command handlers behind each `sdkup` subcommand.
//!
//! Handlers return an [`Output`]; printing is left to `main` so that `--json`
//! can wrap the same data in an envelope.

pub mod current;
pub mod export;
pub mod install;
pub mod list;
pub mod select;
pub mod update;

use std::sync::Arc;

use sdkup_catalog::HttpCatalog;
use sdkup_core::{Config, Manager, paths};
use serde_json::Value;
use tracing::debug;

use crate::cli::{Cli, CliError};

/// Result of a command: human-readable text plus the same data as JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    /// Text printed to stdout; nothing is printed when empty.
    pub text: String,
    /// Payload of the `--json` success envelope.
    pub data: Value,
}

impl Output {
    /// Create an output.
    #[must_use]
    pub fn new(text: impl Into<String>, data: Value) -> Self {
        Self {
            text: text.into(),
            data,
        }
    }
}

/// Collect the global flags into a core configuration.
///
/// # Errors
///
/// Returns a configuration error when no store root is given and the home
/// directory cannot be determined.
pub fn config(cli: &Cli) -> Result<Config, CliError> {
    let root = match &cli.directory {
        Some(dir) => dir.clone(),
        None => paths::root_dir()?,
    };
    let config = Config::new(root, cli.registry.clone());
    Ok(match &cli.platform {
        Some(platform) if !platform.is_empty() => config.with_platform(platform.clone()),
        _ => config,
    })
}

/// Build a manager talking to the HTTP catalog configured by `cli`.
///
/// # Errors
///
/// Returns an error if the configuration is incomplete or the HTTP client
/// cannot be created.
pub fn manager(cli: &Cli) -> Result<Manager, CliError> {
    let config = config(cli)?;
    let mut catalog = HttpCatalog::new(config.registry.clone())?;
    if let Some(platform) = &config.platform {
        catalog = catalog.with_platform(platform.clone());
    }
    debug!(
        root = %config.root().display(),
        registry = %config.registry,
        platform = catalog.platform(),
        "Manager configured"
    );
    Ok(Manager::new(config, Arc::new(catalog)))
}
