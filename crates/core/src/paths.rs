//! Default locations for the sdkup store and catalog.
//!
//! | Setting | Override | Default |
//! |---------|----------|---------|
//! | Store root | `SDKUP_DIR` | `~/.sdkup` |
//! | Catalog URL | `SDKUP_REGISTRY` | `https://api.sdkman.io/2` |
//!
//! Overrides are primarily used by tests and CI; the CLI also exposes them as
//! `--directory` and `--registry`.

use crate::{Error, Result};
use std::path::PathBuf;

/// Environment variable overriding the store root.
pub const ROOT_ENV: &str = "SDKUP_DIR";

/// Environment variable overriding the catalog URL.
pub const REGISTRY_ENV: &str = "SDKUP_REGISTRY";

/// Catalog used when nothing else is configured.
pub const DEFAULT_REGISTRY: &str = "https://api.sdkman.io/2";

/// Get the store root directory.
///
/// Resolution order:
/// 1. `SDKUP_DIR` environment variable
/// 2. Home directory + `/.sdkup`
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn root_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ROOT_ENV)
        && !dir.is_empty()
    {
        return Ok(PathBuf::from(dir));
    }

    let home = dirs::home_dir()
        .ok_or_else(|| Error::configuration("Could not determine home directory"))?;

    Ok(home.join(".sdkup"))
}

/// Get the catalog base URL.
#[must_use]
pub fn registry_url() -> String {
    match std::env::var(REGISTRY_ENV) {
        Ok(url) if !url.is_empty() => url,
        _ => DEFAULT_REGISTRY.to_string(),
    }
}
