//! Locally cached list of known candidates.
//!
//! The list is stored as a single comma-separated line so it can be read
//! without touching the network. It is refreshed from the catalog before
//! installs and by `sdkup update`.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::{Catalog, Error, Result};

/// Result of a best-effort refresh against the catalog.
///
/// A failed refresh is an outcome, not an error: callers continue with the
/// previously cached list.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// The catalog list matched the cached list.
    Unchanged,
    /// The cached list was replaced.
    Updated {
        /// Candidates new in the catalog.
        added: Vec<String>,
        /// Candidates no longer in the catalog.
        removed: Vec<String>,
    },
    /// The catalog could not be queried or the cache not written.
    Failed(Error),
}

impl RefreshOutcome {
    /// Whether the refresh failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Persistent key-value store of candidate names.
#[derive(Debug, Clone)]
pub struct CandidateCache {
    path: PathBuf,
}

impl CandidateCache {
    /// Create a cache backed by `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load cached candidates; a missing file is an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn load(&self) -> Result<Vec<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(split_list(&content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(Error::io(e, &self.path, "read candidate cache")),
        }
    }

    /// Whether `candidate` is in the cached list.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be read.
    pub fn contains(&self, candidate: &str) -> Result<bool> {
        Ok(self.load()?.iter().any(|c| c == candidate))
    }

    /// Replace the cached list.
    ///
    /// The file is written to a temporary sibling and renamed into place.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, candidates: &[String]) -> Result<()> {
        let dir = self
            .path
            .parent()
            .ok_or_else(|| Error::configuration("candidate cache path has no parent"))?;
        std::fs::create_dir_all(dir).map_err(|e| Error::io(e, dir, "create cache directory"))?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .map_err(|e| Error::io(e, dir, "create temporary cache file"))?;
        tmp.write_all(candidates.join(",").as_bytes())
            .map_err(|e| Error::io(e, tmp.path(), "write candidate cache"))?;
        tmp.persist(&self.path)
            .map_err(|e| Error::io(e.error, &self.path, "persist candidate cache"))?;

        debug!(count = candidates.len(), path = ?self.path, "Saved candidate cache");
        Ok(())
    }

    /// Refresh from the catalog, recording the outcome instead of failing.
    pub async fn refresh(&self, catalog: &dyn Catalog) -> RefreshOutcome {
        let fresh = match catalog.list_candidates().await {
            Ok(list) => list,
            Err(e) => {
                warn!(error = %e, "Could not refresh candidate list; using cached list");
                return RefreshOutcome::Failed(e);
            }
        };
        let cached = match self.load() {
            Ok(list) => list,
            Err(e) => return RefreshOutcome::Failed(e),
        };

        let fresh_set: BTreeSet<_> = fresh.iter().cloned().collect();
        let cached_set: BTreeSet<_> = cached.into_iter().collect();
        let added: Vec<_> = fresh_set.difference(&cached_set).cloned().collect();
        let removed: Vec<_> = cached_set.difference(&fresh_set).cloned().collect();

        if added.is_empty() && removed.is_empty() {
            return RefreshOutcome::Unchanged;
        }
        if let Err(e) = self.save(&fresh) {
            warn!(error = %e, "Could not save refreshed candidate list");
            return RefreshOutcome::Failed(e);
        }
        debug!(added = added.len(), removed = removed.len(), "Candidate list refreshed");
        RefreshOutcome::Updated { added, removed }
    }
}

/// Split a comma- or newline-separated catalog list.
#[must_use]
pub fn split_list(content: &str) -> Vec<String> {
    content
        .split([',', '\n', '\r'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list("java, gradle,maven\n"),
            vec!["java", "gradle", "maven"]
        );
        assert!(split_list("").is_empty());
        assert!(split_list(" , ,").is_empty());
    }

    #[test]
    fn test_missing_cache_is_empty() {
        let temp = TempDir::new().unwrap();
        let cache = CandidateCache::new(temp.path().join("var").join("candidates"));
        assert!(cache.load().unwrap().is_empty());
        assert!(!cache.contains("java").unwrap());
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let cache = CandidateCache::new(temp.path().join("var").join("candidates"));
        cache
            .save(&["java".to_string(), "gradle".to_string()])
            .unwrap();

        assert_eq!(cache.load().unwrap(), vec!["java", "gradle"]);
        assert!(cache.contains("gradle").unwrap());
        assert!(!cache.contains("gradl").unwrap());
        assert_eq!(
            std::fs::read_to_string(cache.path()).unwrap(),
            "java,gradle"
        );
    }

    #[test]
    fn test_save_overwrites() {
        let temp = TempDir::new().unwrap();
        let cache = CandidateCache::new(temp.path().join("candidates"));
        cache.save(&["a".to_string()]).unwrap();
        cache.save(&["b".to_string()]).unwrap();
        assert_eq!(cache.load().unwrap(), vec!["b"]);
    }
}
