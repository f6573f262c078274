use clap::{Parser, Subcommand};
use miette::{Diagnostic, Report};
use sdkup_core::Error as CoreError;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

use crate::tracing::{LogLevel, TracingFormat};

/// Exit codes for the CLI application
pub const EXIT_OK: i32 = 0;
/// Unexpected error (I/O, runtime setup)
pub const EXIT_OTHER: i32 = 1;
/// Usage or configuration error
pub const EXIT_CLI: i32 = 2;
/// Candidate is not known to the catalog
pub const EXIT_INVALID_CANDIDATE: i32 = 3;
/// Requested version is already installed
pub const EXIT_ALREADY_INSTALLED: i32 = 4;
/// No version could be resolved
pub const EXIT_RESOLUTION: i32 = 5;
/// Network or download failure
pub const EXIT_DOWNLOAD: i32 = 6;
/// Archive could not be installed
pub const EXIT_INSTALL_FAILED: i32 = 7;
/// Current version could not be switched
pub const EXIT_USE: i32 = 8;
/// Requested version is not offered by the catalog
pub const EXIT_INVALID_VERSION: i32 = 9;
/// Requested version or current selection does not exist locally
pub const EXIT_NOT_INSTALLED: i32 = 10;

/// CLI-specific error types with proper exit code mapping
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Error reported by the SDK manager
    #[error(transparent)]
    #[diagnostic(transparent)]
    Core(#[from] CoreError),

    /// Other unexpected error (exit code 1)
    #[error("Unexpected error: {message}")]
    #[diagnostic(code(sdkup::cli::other))]
    Other {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Create a new other error
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            help: None,
        }
    }

    /// Stable machine-readable code for JSON envelopes.
    #[must_use]
    pub fn code(&self) -> String {
        Diagnostic::code(self).map_or_else(|| "sdkup::unknown".to_string(), |c| c.to_string())
    }
}

/// Map CLI error to appropriate exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Core(core) => match core {
            CoreError::InvalidCandidate { .. } => EXIT_INVALID_CANDIDATE,
            CoreError::AlreadyInstalled { .. } => EXIT_ALREADY_INSTALLED,
            CoreError::Resolution { .. } => EXIT_RESOLUTION,
            CoreError::Download { .. } | CoreError::Catalog { .. } => EXIT_DOWNLOAD,
            CoreError::InstallFailed { .. } | CoreError::Archive { .. } => EXIT_INSTALL_FAILED,
            CoreError::Use { .. } => EXIT_USE,
            CoreError::InvalidVersion { .. } | CoreError::InvalidPath { .. } => {
                EXIT_INVALID_VERSION
            }
            CoreError::NotInstalled { .. }
            | CoreError::NoCurrent { .. }
            | CoreError::NothingInUse => EXIT_NOT_INSTALLED,
            CoreError::Configuration { .. } => EXIT_CLI,
            CoreError::Io { .. } => EXIT_OTHER,
        },
        CliError::Other { .. } => EXIT_OTHER,
    }
}

/// Render error appropriately based on JSON flag
#[allow(clippy::print_stdout, clippy::print_stderr)]
pub fn render_error(err: CliError, json_mode: bool) {
    if json_mode {
        let error_envelope = ErrorEnvelope::new(serde_json::json!({
            "code": err.code(),
            "exit_code": exit_code_for(&err),
            "message": err.to_string()
        }));

        match serde_json::to_string(&error_envelope) {
            Ok(json) => println!("{json}"),
            Err(_) => eprintln!("Error serializing error response"),
        }
    } else {
        // Use miette for human-friendly error display
        let report = Report::new(err);
        eprintln!("{report:?}");
        // Ensure output is flushed before potential process exit
        let _ = io::stderr().flush();
    }
}

/// Success response envelope for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkEnvelope<T> {
    /// Status indicator - always "ok" for success
    pub status: &'static str,
    /// The actual data payload
    pub data: T,
}

impl<T> OkEnvelope<T> {
    /// Create a new success envelope
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self { status: "ok", data }
    }
}

/// Error response envelope for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope<E> {
    /// Status indicator - always "error" for failures
    pub status: &'static str,
    /// The error details
    pub error: E,
}

impl<E> ErrorEnvelope<E> {
    /// Create a new error envelope
    #[must_use]
    pub const fn new(error: E) -> Self {
        Self {
            status: "error",
            error,
        }
    }
}

/// Install and switch between versions of development SDKs.
#[derive(Parser, Debug)]
#[command(name = "sdkup")]
#[command(about = "Install and switch between versions of development SDKs")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Logging verbosity level.
    #[arg(
        short = 'L',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    /// Log output format.
    #[arg(
        long,
        global = true,
        help = "Log output format",
        default_value = "compact",
        value_enum
    )]
    pub log_format: TracingFormat,

    /// Emit JSON envelope instead of text.
    #[arg(long, global = true, help = "Emit JSON envelope instead of text")]
    pub json: bool,

    /// Store root directory.
    #[arg(
        long,
        short = 'd',
        global = true,
        env = "SDKUP_DIR",
        help = "Store root directory [default: ~/.sdkup]"
    )]
    pub directory: Option<PathBuf>,

    /// Catalog base URL.
    #[arg(
        long,
        global = true,
        env = "SDKUP_REGISTRY",
        help = "Catalog base URL",
        default_value = sdkup_core::paths::DEFAULT_REGISTRY
    )]
    pub registry: String,

    /// Platform identifier sent to the catalog.
    #[arg(
        long,
        global = true,
        env = "SDKUP_PLATFORM",
        help = "Platform identifier sent to the catalog (e.g. linuxx64, darwinarm64)"
    )]
    pub platform: Option<String>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install a candidate version and make it current.
    #[command(
        about = "Install a candidate version and make it current",
        visible_alias = "i"
    )]
    Install {
        /// Target as `candidate[@version]`; the catalog default is used without a version.
        #[arg(value_name = "CANDIDATE[@VERSION]")]
        target: String,
    },
    /// Make an installed version current.
    #[command(about = "Make an installed version current", visible_alias = "u")]
    Use {
        /// Target as `candidate@version`.
        #[arg(value_name = "CANDIDATE@VERSION")]
        target: String,
    },
    /// Show current versions.
    #[command(about = "Show current versions", visible_alias = "c")]
    Current {
        /// Only show this candidate.
        candidate: Option<String>,
    },
    /// Print shell commands that put current versions on PATH.
    #[command(about = "Print shell commands that put current versions on PATH")]
    Export {
        /// Shell type (bash, zsh, fish, powershell); detected from $SHELL if omitted.
        #[arg(help = "Shell type (bash, zsh, fish, powershell)")]
        shell: Option<String>,
    },
    /// List candidates, or the versions of one candidate.
    #[command(
        about = "List candidates, or the versions of one candidate",
        visible_alias = "ls"
    )]
    List {
        /// Candidate whose versions to list.
        candidate: Option<String>,
    },
    /// Refresh the cached candidate list.
    #[command(about = "Refresh the cached candidate list")]
    Update,
}

/// Parse command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
