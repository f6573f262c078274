//! Tests for error types

use miette::Diagnostic;
use sdkup_core::{Error, Sdk};
use std::path::Path;

#[test]
fn test_invalid_candidate_error() {
    let error = Error::invalid_candidate("nosuch");
    assert_eq!(error.to_string(), "Invalid candidate: nosuch");
    assert_eq!(
        error.help().map(|h| h.to_string()).as_deref(),
        Some("Run `sdkup list` to see available candidates")
    );
}

#[test]
fn test_already_installed_error() {
    let error = Error::already_installed(&Sdk::new("java", "21.0.2-tem"));
    assert_eq!(error.to_string(), "java 21.0.2-tem is already installed");
    assert_eq!(
        error.help().map(|h| h.to_string()).as_deref(),
        Some("Run `sdkup use java@21.0.2-tem` to make it current")
    );
}

#[test]
fn test_download_error() {
    let error = Error::download(&Sdk::new("gradle", "8.5"), "connection reset");
    assert_eq!(
        error.to_string(),
        "Download of gradle@8.5 failed: connection reset"
    );
}

#[test]
fn test_install_failed_error() {
    let error = Error::install_failed(&Sdk::new("maven", "3.9.6"), "corrupt archive");
    assert_eq!(
        error.to_string(),
        "Installation of maven@3.9.6 failed: corrupt archive"
    );
}

#[test]
fn test_resolution_error() {
    let error = Error::resolution("kotlin", "no default version");
    assert_eq!(
        error.to_string(),
        "Could not resolve a version of kotlin: no default version"
    );
}

#[test]
fn test_io_error_with_path() {
    let error = Error::io(
        std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        Path::new("/sdk/candidates"),
        "create directory",
    );
    assert_eq!(
        error.to_string(),
        "I/O create directory failed on /sdk/candidates: denied"
    );
}

#[test]
fn test_io_error_from_std() {
    let error: Error = std::io::Error::other("boom").into();
    assert_eq!(error.to_string(), "I/O operation failed: boom");
}

#[test]
fn test_diagnostic_codes() {
    let cases: Vec<(Error, &str)> = vec![
        (Error::invalid_candidate("x"), "sdkup::invalid_candidate"),
        (Error::catalog("down"), "sdkup::catalog"),
        (Error::use_failed(&Sdk::new("x", "1"), "gone"), "sdkup::use_failed"),
        (Error::NothingInUse, "sdkup::nothing_in_use"),
    ];
    for (error, code) in cases {
        assert_eq!(error.code().map(|c| c.to_string()).as_deref(), Some(code));
    }
}
