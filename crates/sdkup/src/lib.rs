// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

//! sdkup - install and switch between versions of development SDKs
//!
//! The binary is a thin shell over this library:
//!
//! - [`cli`] defines the clap surface, error rendering and exit codes
//! - [`commands`] turns each subcommand into calls on [`sdkup_core::Manager`]
//! - [`tracing`] configures logging to stderr

/// CLI argument parsing and exit codes.
pub mod cli;
/// Command implementations (install, use, current, export, list, update).
pub mod commands;
/// Tracing configuration.
pub mod tracing;
