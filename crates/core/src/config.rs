//! Explicit configuration threaded through the store, resolver and installer.

use std::path::{Path, PathBuf};

use crate::Result;
use crate::paths;

/// Runtime configuration for one sdkup invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Store root containing `candidates/`, `archives/` and `var/`.
    pub root: PathBuf,
    /// Catalog base URL.
    pub registry: String,
    /// Platform identifier override sent to the catalog.
    pub platform: Option<String>,
}

impl Config {
    /// Create a configuration for the given root and catalog.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, registry: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            registry: registry.into(),
            platform: None,
        }
    }

    /// Build a configuration from environment overrides and defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if no store root can be determined.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(paths::root_dir()?, paths::registry_url()))
    }

    /// Set the platform override.
    #[must_use]
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    /// The store root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File holding the cached candidate list.
    #[must_use]
    pub fn candidates_file(&self) -> PathBuf {
        self.root.join("var").join("candidates")
    }
}
