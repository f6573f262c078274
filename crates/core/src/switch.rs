//! Atomic replacement of a candidate's `current` link.

use std::path::Path;
use tracing::{debug, info};

use crate::store::VersionStore;
use crate::{Error, Result, Sdk};

/// Point `candidates/<candidate>/current` at the installed `sdk`.
///
/// A new relative link is created under a temporary name and renamed over
/// `current`, so concurrent readers see either the old or the new target and
/// never a missing link.
///
/// # Errors
///
/// Returns [`Error::Use`] if the version directory does not exist or the link
/// cannot be created or moved into place.
pub fn use_version(store: &VersionStore, sdk: &Sdk) -> Result<()> {
    let version_dir = store.version_dir(sdk)?;
    if !version_dir.is_dir() {
        return Err(Error::use_failed(sdk, "version directory does not exist"));
    }

    let link = store.current_link(&sdk.candidate)?;
    let candidate_dir = store.candidate_dir(&sdk.candidate)?;
    let staged = candidate_dir.join(format!(".current-{}", uuid::Uuid::new_v4()));

    symlink_dir(Path::new(&sdk.version), &staged)
        .map_err(|e| Error::use_failed(sdk, format!("failed to create link: {e}")))?;
    debug!(?staged, "Staged current link");

    if let Err(e) = replace(&staged, &link) {
        let _ = std::fs::remove_file(&staged);
        return Err(Error::use_failed(sdk, format!("failed to replace link: {e}")));
    }

    info!(%sdk, "Switched current version");
    Ok(())
}

#[cfg(unix)]
fn symlink_dir(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_dir(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

#[cfg(unix)]
fn replace(staged: &Path, link: &Path) -> std::io::Result<()> {
    std::fs::rename(staged, link)
}

// Directory links cannot be renamed over each other on Windows.
#[cfg(windows)]
fn replace(staged: &Path, link: &Path) -> std::io::Result<()> {
    match std::fs::rename(staged, link) {
        Ok(()) => Ok(()),
        Err(_) => {
            if std::fs::symlink_metadata(link).is_ok() {
                std::fs::remove_dir(link).or_else(|_| std::fs::remove_file(link))?;
            }
            std::fs::rename(staged, link)
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn install_fake(store: &VersionStore, sdk: &Sdk) {
        std::fs::create_dir_all(store.version_dir(sdk).unwrap().join("bin")).unwrap();
    }

    #[test]
    fn test_use_creates_relative_link() {
        let temp = TempDir::new().unwrap();
        let store = VersionStore::new(temp.path());
        let sdk = Sdk::new("tool", "1.0");
        install_fake(&store, &sdk);

        use_version(&store, &sdk).unwrap();

        let link = store.current_link("tool").unwrap();
        assert_eq!(std::fs::read_link(&link).unwrap(), Path::new("1.0"));
        assert!(link.join("bin").is_dir());
        assert_eq!(store.current_version("tool"), Some("1.0".to_string()));
    }

    #[test]
    fn test_use_replaces_existing_link() {
        let temp = TempDir::new().unwrap();
        let store = VersionStore::new(temp.path());
        install_fake(&store, &Sdk::new("tool", "1.0"));
        install_fake(&store, &Sdk::new("tool", "2.0"));

        use_version(&store, &Sdk::new("tool", "1.0")).unwrap();
        use_version(&store, &Sdk::new("tool", "2.0")).unwrap();

        assert_eq!(store.current_version("tool"), Some("2.0".to_string()));
        // No staged links left behind.
        let leftovers: Vec<_> = std::fs::read_dir(store.candidate_dir("tool").unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".current-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_use_missing_version_fails() {
        let temp = TempDir::new().unwrap();
        let store = VersionStore::new(temp.path());
        install_fake(&store, &Sdk::new("tool", "1.0"));
        use_version(&store, &Sdk::new("tool", "1.0")).unwrap();

        let result = use_version(&store, &Sdk::new("tool", "9.9"));

        assert!(matches!(result, Err(Error::Use { .. })));
        assert_eq!(store.current_version("tool"), Some("1.0".to_string()));
    }
}
