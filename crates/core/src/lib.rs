//! Core of the sdkup SDK manager
//!
//! This crate owns everything that happens on the local machine:
//! - Target parsing and resolution (`candidate[@version]`)
//! - The filesystem version store and its `current` links
//! - The cached candidate list
//! - The concurrent acquire/extract install pipeline
//! - Shell export rendering
//!
//! The remote catalog is reached only through the [`Catalog`] trait; an HTTP
//! implementation lives in `sdkup-catalog`.

pub mod archive;
pub mod candidates;
pub mod catalog;
pub mod config;
mod error;
pub mod install;
pub mod manager;
pub mod paths;
pub mod resolver;
pub mod sdk;
pub mod shell;
pub mod store;
pub mod switch;

// Re-export error types at crate root
pub use error::{Error, Result};

// Re-export main types
pub use archive::ArchiveFormat;
pub use candidates::{CandidateCache, RefreshOutcome};
pub use catalog::{ByteStream, Catalog, Download};
pub use config::Config;
pub use install::Installer;
pub use manager::{Installation, Manager, VersionEntry};
pub use resolver::Resolver;
pub use sdk::Sdk;
pub use shell::{Exports, Shell};
pub use store::{ArchivedFile, VersionStore, validate_segment};
pub use switch::use_version;
