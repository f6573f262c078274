//! Filesystem-backed version store.
//!
//! Layout under the store root:
//!
//! ```text
//! <root>/
//! ├── candidates/
//! │   └── <candidate>/
//! │       ├── <version>/     # installed payload
//! │       └── current -> <version>
//! └── archives/
//!     └── <candidate>/
//!         └── <version>.<ext>
//! ```
//!
//! Shell integration depends on this layout, so it must stay stable.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::trace;

use crate::archive::{ARCHIVE_EXTENSIONS, ArchiveFormat};
use crate::{Error, Result, Sdk};

/// Name of the per-candidate current-version link.
pub const CURRENT_LINK: &str = "current";

/// A cached archive located in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedFile {
    /// Path of the archive file.
    pub path: PathBuf,
    /// Format inferred from the file extension.
    pub format: ArchiveFormat,
}

/// Reject values that are unsafe as a single path segment.
///
/// # Errors
///
/// Returns [`Error::InvalidPath`] for empty values, separators, NUL bytes,
/// leading dots (which covers `.` and `..`) and the reserved `current` name.
pub fn validate_segment<'a>(kind: &'static str, value: &'a str) -> Result<&'a str> {
    let reason = if value.is_empty() {
        Some("must not be empty")
    } else if value.starts_with('.') {
        Some("must not start with '.'")
    } else if value.contains(['/', '\\']) {
        Some("must not contain path separators")
    } else if value.contains('\0') {
        Some("must not contain NUL bytes")
    } else if value.chars().any(char::is_whitespace) {
        Some("must not contain whitespace")
    } else if value == CURRENT_LINK {
        Some("is a reserved name")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::InvalidPath {
            kind,
            value: value.to_string(),
            reason,
        }),
        None => Ok(value),
    }
}

/// Installed versions, cached archives and current pointers on disk.
///
/// All queries are pure filesystem reads; nothing here touches the network.
#[derive(Debug, Clone)]
pub struct VersionStore {
    root: PathBuf,
}

impl VersionStore {
    /// Create a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The store root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Top-level directory holding installed candidates.
    #[must_use]
    pub fn candidates_dir(&self) -> PathBuf {
        self.root.join("candidates")
    }

    /// Top-level directory holding cached archives.
    #[must_use]
    pub fn archives_dir(&self) -> PathBuf {
        self.root.join("archives")
    }

    /// Create `candidates/` and `archives/`.
    ///
    /// Idempotent and safe to call concurrently.
    ///
    /// # Errors
    ///
    /// Returns an error if either directory cannot be created.
    pub fn ensure_directories(&self) -> Result<()> {
        ensure_directories(&self.root)
    }

    /// Directory holding every version of `candidate`.
    ///
    /// # Errors
    ///
    /// Returns an error if `candidate` is not a safe path segment.
    pub fn candidate_dir(&self, candidate: &str) -> Result<PathBuf> {
        Ok(self
            .candidates_dir()
            .join(validate_segment("candidate", candidate)?))
    }

    /// Installed payload directory of `sdk`.
    ///
    /// # Errors
    ///
    /// Returns an error for partial targets or unsafe names.
    pub fn version_dir(&self, sdk: &Sdk) -> Result<PathBuf> {
        Ok(self
            .candidate_dir(&sdk.candidate)?
            .join(validate_segment("version", &sdk.version)?))
    }

    /// The `current` link of `candidate`.
    ///
    /// # Errors
    ///
    /// Returns an error if `candidate` is not a safe path segment.
    pub fn current_link(&self, candidate: &str) -> Result<PathBuf> {
        Ok(self.candidate_dir(candidate)?.join(CURRENT_LINK))
    }

    /// Archive cache directory of `candidate`.
    ///
    /// # Errors
    ///
    /// Returns an error if `candidate` is not a safe path segment.
    pub fn archive_dir(&self, candidate: &str) -> Result<PathBuf> {
        Ok(self
            .archives_dir()
            .join(validate_segment("candidate", candidate)?))
    }

    /// Cache path of the archive of `sdk` in the given format.
    ///
    /// # Errors
    ///
    /// Returns an error for partial targets or unsafe names.
    pub fn archive_path(&self, sdk: &Sdk, format: ArchiveFormat) -> Result<PathBuf> {
        let version = validate_segment("version", &sdk.version)?;
        Ok(self
            .archive_dir(&sdk.candidate)?
            .join(format!("{version}.{}", format.extension())))
    }

    /// Locate a cached archive of `sdk` in any known format.
    #[must_use]
    pub fn find_archive(&self, sdk: &Sdk) -> Option<ArchivedFile> {
        let dir = self.archive_dir(&sdk.candidate).ok()?;
        let version = validate_segment("version", &sdk.version).ok()?;

        ARCHIVE_EXTENSIONS.iter().find_map(|ext| {
            let path = dir.join(format!("{version}.{ext}"));
            if path.is_file() {
                trace!(?path, "Archive cache hit");
                ArchiveFormat::parse(ext).map(|format| ArchivedFile { path, format })
            } else {
                None
            }
        })
    }

    /// Whether `sdk` has a non-empty installed directory.
    #[must_use]
    pub fn is_installed(&self, sdk: &Sdk) -> bool {
        self.version_dir(sdk)
            .map(|dir| is_populated_dir(&dir))
            .unwrap_or(false)
    }

    /// Whether an archive of `sdk` is cached.
    #[must_use]
    pub fn is_archived(&self, sdk: &Sdk) -> bool {
        self.find_archive(sdk).is_some()
    }

    /// Installed versions of `candidate`.
    ///
    /// Hidden entries (staging directories) and the `current` link are ignored.
    #[must_use]
    pub fn installed_versions(&self, candidate: &str) -> BTreeSet<String> {
        let Ok(dir) = self.candidate_dir(candidate) else {
            return BTreeSet::new();
        };
        let Ok(entries) = std::fs::read_dir(&dir) else {
            return BTreeSet::new();
        };

        entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| validate_segment("version", name).is_ok())
            .filter(|name| is_populated_dir(&dir.join(name)))
            .filter(|name| !is_symlink(&dir.join(name)))
            .collect()
    }

    /// Version `current` points to, if it points to an installed version.
    #[must_use]
    pub fn current_version(&self, candidate: &str) -> Option<String> {
        let link = self.current_link(candidate).ok()?;
        let target = std::fs::read_link(&link).ok()?;
        let version = target.file_name()?.to_str()?.to_string();

        let sdk = Sdk::new(candidate, version);
        if self.is_installed(&sdk) {
            Some(sdk.version)
        } else {
            trace!(?link, ?target, "Current link does not point to an installed version");
            None
        }
    }

    /// Candidates with at least one directory under `candidates/`.
    #[must_use]
    pub fn candidates(&self) -> BTreeSet<String> {
        let Ok(entries) = std::fs::read_dir(self.candidates_dir()) else {
            return BTreeSet::new();
        };
        entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| validate_segment("candidate", name).is_ok())
            .collect()
    }

    /// Every candidate with a current version, as fully qualified targets.
    #[must_use]
    pub fn current_sdks(&self) -> Vec<Sdk> {
        self.candidates()
            .into_iter()
            .filter_map(|candidate| {
                self.current_version(&candidate)
                    .map(|version| Sdk::new(candidate, version))
            })
            .collect()
    }
}

/// Create `candidates/` and `archives/` under `root`.
///
/// # Errors
///
/// Returns an error if either directory cannot be created.
pub fn ensure_directories(root: &Path) -> Result<()> {
    for dir in [root.join("candidates"), root.join("archives")] {
        // create_dir_all tolerates directories created concurrently.
        std::fs::create_dir_all(&dir).map_err(|e| Error::io(e, &dir, "create directory"))?;
    }
    Ok(())
}

fn is_populated_dir(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

fn is_symlink(path: &Path) -> bool {
    std::fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, VersionStore) {
        let temp = TempDir::new().unwrap();
        let store = VersionStore::new(temp.path());
        (temp, store)
    }

    fn install_fake(store: &VersionStore, sdk: &Sdk) {
        let dir = store.version_dir(sdk).unwrap();
        std::fs::create_dir_all(dir.join("bin")).unwrap();
    }

    #[test]
    fn test_validate_segment() {
        assert!(validate_segment("version", "21.0.2-tem").is_ok());
        assert!(validate_segment("candidate", "java").is_ok());
        for bad in ["", ".", "..", "../etc", "a/b", "a\\b", ".hidden", "a\0b", "a b", "current"] {
            assert!(
                matches!(
                    validate_segment("version", bad),
                    Err(Error::InvalidPath { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_paths() {
        let store = VersionStore::new("/srv/sdk");
        let sdk = Sdk::new("java", "21");
        assert_eq!(
            store.version_dir(&sdk).unwrap(),
            PathBuf::from("/srv/sdk/candidates/java/21")
        );
        assert_eq!(
            store.current_link("java").unwrap(),
            PathBuf::from("/srv/sdk/candidates/java/current")
        );
        assert_eq!(
            store.archive_path(&sdk, ArchiveFormat::TarGz).unwrap(),
            PathBuf::from("/srv/sdk/archives/java/21.tar.gz")
        );
    }

    #[test]
    fn test_traversal_rejected_in_paths() {
        let store = VersionStore::new("/srv/sdk");
        assert!(store.version_dir(&Sdk::new("java", "../../etc")).is_err());
        assert!(store.candidate_dir("..").is_err());
        assert!(store.archive_path(&Sdk::new("../x", "1"), ArchiveFormat::Zip).is_err());
        assert!(!store.is_installed(&Sdk::new("..", "..")));
    }

    #[test]
    fn test_partial_target_has_no_version_dir() {
        let store = VersionStore::new("/srv/sdk");
        assert!(store.version_dir(&Sdk::partial("java")).is_err());
    }

    #[test]
    fn test_ensure_directories_is_idempotent() {
        let (_temp, store) = store();
        store.ensure_directories().unwrap();
        store.ensure_directories().unwrap();
        assert!(store.candidates_dir().is_dir());
        assert!(store.archives_dir().is_dir());
    }

    #[test]
    fn test_is_installed_requires_non_empty_dir() {
        let (_temp, store) = store();
        let sdk = Sdk::new("tool", "1.0");
        assert!(!store.is_installed(&sdk));

        std::fs::create_dir_all(store.version_dir(&sdk).unwrap()).unwrap();
        assert!(!store.is_installed(&sdk), "empty dir is not an install");

        install_fake(&store, &sdk);
        assert!(store.is_installed(&sdk));
    }

    #[test]
    fn test_find_archive_any_extension() {
        let (_temp, store) = store();
        let sdk = Sdk::new("tool", "1.0");
        assert!(!store.is_archived(&sdk));

        let dir = store.archive_dir("tool").unwrap();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("1.0.tar"), b"data").unwrap();

        let found = store.find_archive(&sdk).unwrap();
        assert_eq!(found.format, ArchiveFormat::Tar);
        assert_eq!(found.path, dir.join("1.0.tar"));
        assert!(store.is_archived(&sdk));
        assert!(!store.is_archived(&Sdk::new("tool", "1.1")));
    }

    #[test]
    fn test_partial_download_is_not_archived() {
        let (_temp, store) = store();
        let dir = store.archive_dir("tool").unwrap();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(".1.0.zip.part"), b"half").unwrap();
        assert!(!store.is_archived(&Sdk::new("tool", "1.0")));
    }

    #[test]
    fn test_installed_versions_skips_hidden_and_empty() {
        let (_temp, store) = store();
        install_fake(&store, &Sdk::new("tool", "1.0"));
        install_fake(&store, &Sdk::new("tool", "2.0"));
        let candidate_dir = store.candidate_dir("tool").unwrap();
        std::fs::create_dir_all(candidate_dir.join(".staging-abc").join("x")).unwrap();
        std::fs::create_dir_all(candidate_dir.join("3.0")).unwrap();

        let versions: Vec<_> = store.installed_versions("tool").into_iter().collect();
        assert_eq!(versions, vec!["1.0".to_string(), "2.0".to_string()]);
        assert!(store.installed_versions("missing").is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_current_version_follows_link() {
        let (_temp, store) = store();
        let sdk = Sdk::new("tool", "1.0");
        install_fake(&store, &sdk);
        assert_eq!(store.current_version("tool"), None);

        std::os::unix::fs::symlink("1.0", store.current_link("tool").unwrap()).unwrap();
        assert_eq!(store.current_version("tool"), Some("1.0".to_string()));
        assert_eq!(store.current_sdks(), vec![sdk]);
        assert!(!store.installed_versions("tool").contains(CURRENT_LINK));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_current_is_absent() {
        let (_temp, store) = store();
        std::fs::create_dir_all(store.candidate_dir("tool").unwrap()).unwrap();
        std::os::unix::fs::symlink("9.9", store.current_link("tool").unwrap()).unwrap();
        assert_eq!(store.current_version("tool"), None);
        assert!(store.current_sdks().is_empty());
    }
}
