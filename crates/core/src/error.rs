//! Error types for sdkup operations.

use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

use crate::sdk::Sdk;

/// Result type alias for sdkup operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for sdkup operations.
///
/// Every variant corresponds to one user-visible outcome; the CLI maps each of
/// them onto a distinct exit code.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The candidate is not in the known-candidate set.
    #[error("Invalid candidate: {candidate}")]
    #[diagnostic(code(sdkup::invalid_candidate))]
    InvalidCandidate {
        /// The rejected candidate name.
        candidate: String,
        /// Optional help text.
        #[help]
        help: Option<String>,
    },

    /// A version could not be resolved from the catalog.
    #[error("Could not resolve a version of {candidate}: {message}")]
    #[diagnostic(
        code(sdkup::resolution),
        help("Check your network connection and try again")
    )]
    Resolution {
        /// The candidate being resolved.
        candidate: String,
        /// Error message.
        message: String,
    },

    /// The catalog does not offer the requested version.
    #[error("{candidate} {version} is not available")]
    #[diagnostic(
        code(sdkup::invalid_version),
        help("Run `sdkup list {candidate}` to see available versions")
    )]
    InvalidVersion {
        /// The candidate name.
        candidate: String,
        /// The requested version.
        version: String,
    },

    /// The resolved version is already installed.
    #[error("{candidate} {version} is already installed")]
    #[diagnostic(
        code(sdkup::already_installed),
        help("Run `sdkup use {candidate}@{version}` to make it current")
    )]
    AlreadyInstalled {
        /// The candidate name.
        candidate: String,
        /// The installed version.
        version: String,
    },

    /// The requested version is not installed.
    #[error("{candidate} {version} is not installed")]
    #[diagnostic(
        code(sdkup::not_installed),
        help("Run `sdkup install {candidate}@{version}` first")
    )]
    NotInstalled {
        /// The candidate name.
        candidate: String,
        /// The requested version.
        version: String,
    },

    /// No current version is selected for a candidate.
    #[error("No current version of {candidate} is in use")]
    #[diagnostic(code(sdkup::no_current))]
    NoCurrent {
        /// The candidate name.
        candidate: String,
    },

    /// No candidate has a current version.
    #[error("No candidates are in use")]
    #[diagnostic(code(sdkup::nothing_in_use))]
    NothingInUse,

    /// Fetching archive bytes failed.
    #[error("Download of {target} failed: {message}")]
    #[diagnostic(
        code(sdkup::download),
        help("Check your network connection and retry the install")
    )]
    Download {
        /// The target being downloaded (`candidate@version`).
        target: String,
        /// Error message.
        message: String,
    },

    /// The catalog could not be queried.
    #[error("Catalog request failed: {message}")]
    #[diagnostic(code(sdkup::catalog))]
    Catalog {
        /// Error message.
        message: String,
    },

    /// Turning an archive into an installed directory failed.
    #[error("Installation of {target} failed: {message}")]
    #[diagnostic(
        code(sdkup::install_failed),
        help("The downloaded archive was kept; retrying the install will reuse it")
    )]
    InstallFailed {
        /// The target being installed (`candidate@version`).
        target: String,
        /// Error message.
        message: String,
    },

    /// Switching the current version failed.
    #[error("Could not use {target}: {message}")]
    #[diagnostic(code(sdkup::use_failed))]
    Use {
        /// The target being selected (`candidate@version`).
        target: String,
        /// Error message.
        message: String,
    },

    /// An archive could not be read.
    #[error("Unreadable archive {}: {message}", .path.display())]
    #[diagnostic(code(sdkup::archive))]
    Archive {
        /// Path of the archive.
        path: Box<Path>,
        /// Error message.
        message: String,
    },

    /// A candidate or version string is unsafe to use as a path segment.
    #[error("Invalid {kind} '{value}': {reason}")]
    #[diagnostic(code(sdkup::invalid_path))]
    InvalidPath {
        /// What was being validated (`candidate` or `version`).
        kind: &'static str,
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Configuration could not be determined.
    #[error("Configuration error: {message}")]
    #[diagnostic(code(sdkup::config))]
    Configuration {
        /// Error message.
        message: String,
    },

    /// I/O failure with context.
    #[error("I/O {operation} failed{}: {source}", display_path(.path.as_deref()))]
    #[diagnostic(code(sdkup::io))]
    Io {
        /// Underlying error.
        #[source]
        source: std::io::Error,
        /// Path involved, if any.
        path: Option<Box<Path>>,
        /// The operation that failed.
        operation: String,
    },
}

impl Error {
    /// Create an invalid candidate error.
    #[must_use]
    pub fn invalid_candidate(candidate: impl Into<String>) -> Self {
        Self::InvalidCandidate {
            candidate: candidate.into(),
            help: Some("Run `sdkup list` to see available candidates".to_string()),
        }
    }

    /// Create a resolution error.
    #[must_use]
    pub fn resolution(candidate: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Resolution {
            candidate: candidate.into(),
            message: message.into(),
        }
    }

    /// Create an invalid version error.
    #[must_use]
    pub fn invalid_version(sdk: &Sdk) -> Self {
        Self::InvalidVersion {
            candidate: sdk.candidate.clone(),
            version: sdk.version.clone(),
        }
    }

    /// Create an already-installed error.
    #[must_use]
    pub fn already_installed(sdk: &Sdk) -> Self {
        Self::AlreadyInstalled {
            candidate: sdk.candidate.clone(),
            version: sdk.version.clone(),
        }
    }

    /// Create a not-installed error.
    #[must_use]
    pub fn not_installed(sdk: &Sdk) -> Self {
        Self::NotInstalled {
            candidate: sdk.candidate.clone(),
            version: sdk.version.clone(),
        }
    }

    /// Create a download error.
    #[must_use]
    pub fn download(sdk: &Sdk, message: impl Into<String>) -> Self {
        Self::Download {
            target: sdk.to_string(),
            message: message.into(),
        }
    }

    /// Create a catalog error.
    #[must_use]
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }

    /// Create an install failed error.
    #[must_use]
    pub fn install_failed(sdk: &Sdk, message: impl Into<String>) -> Self {
        Self::InstallFailed {
            target: sdk.to_string(),
            message: message.into(),
        }
    }

    /// Create a use error.
    #[must_use]
    pub fn use_failed(sdk: &Sdk, message: impl Into<String>) -> Self {
        Self::Use {
            target: sdk.to_string(),
            message: message.into(),
        }
    }

    /// Create an archive error.
    #[must_use]
    pub fn archive(path: &Path, message: impl Into<String>) -> Self {
        Self::Archive {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an I/O error with the path and operation that failed.
    #[must_use]
    pub fn io(source: std::io::Error, path: &Path, operation: impl Into<String>) -> Self {
        Self::Io {
            source,
            path: Some(path.into()),
            operation: operation.into(),
        }
    }
}

fn display_path(path: Option<&Path>) -> String {
    path.map_or(String::new(), |p| format!(" on {}", p.display()))
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            path: None,
            operation: "operation".to_string(),
        }
    }
}
