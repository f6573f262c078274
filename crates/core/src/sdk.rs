//! Candidate/version targets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// A candidate with an optional version.
///
/// An empty `version` marks a partial target that still has to be completed by
/// the [`Resolver`](crate::Resolver).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Sdk {
    /// Candidate name (e.g. "java", "gradle").
    pub candidate: String,
    /// Version string, empty for a partial target.
    pub version: String,
}

impl Sdk {
    /// Create a fully qualified target.
    #[must_use]
    pub fn new(candidate: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            version: version.into(),
        }
    }

    /// Create a partial target without a version.
    #[must_use]
    pub fn partial(candidate: impl Into<String>) -> Self {
        Self::new(candidate, String::new())
    }

    /// Whether the version still needs to be resolved.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.version.is_empty()
    }

    /// The version, if one is set.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        if self.is_partial() {
            None
        } else {
            Some(&self.version)
        }
    }

    /// Return a copy of this target with the given version.
    #[must_use]
    pub fn with_version(&self, version: impl Into<String>) -> Self {
        Self::new(self.candidate.clone(), version)
    }

    /// Parse `candidate[@version]`.
    ///
    /// A trailing `@` is treated the same as a missing version.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCandidate`] when the candidate part is empty.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let (candidate, version) = match s.split_once('@') {
            Some((candidate, version)) => (candidate.trim(), version.trim()),
            None => (s, ""),
        };
        if candidate.is_empty() {
            return Err(Error::invalid_candidate(s));
        }
        Ok(Self::new(candidate, version))
    }
}

impl FromStr for Sdk {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Sdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_partial() {
            write!(f, "{}", self.candidate)
        } else {
            write!(f, "{}@{}", self.candidate, self.version)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_version() {
        let sdk = Sdk::parse("java@21.0.2-tem").unwrap();
        assert_eq!(sdk.candidate, "java");
        assert_eq!(sdk.version, "21.0.2-tem");
        assert!(!sdk.is_partial());
    }

    #[test]
    fn test_parse_without_version() {
        let sdk = Sdk::parse("gradle").unwrap();
        assert_eq!(sdk, Sdk::partial("gradle"));
        assert!(sdk.is_partial());
        assert_eq!(sdk.version(), None);
    }

    #[test]
    fn test_parse_trailing_at_is_partial() {
        let sdk: Sdk = "maven@".parse().unwrap();
        assert!(sdk.is_partial());
        assert_eq!(sdk.candidate, "maven");
    }

    #[test]
    fn test_parse_empty_candidate() {
        assert!(matches!(
            Sdk::parse("@1.0"),
            Err(Error::InvalidCandidate { .. })
        ));
        assert!(matches!(Sdk::parse("  "), Err(Error::InvalidCandidate { .. })));
    }

    #[test]
    fn test_display() {
        assert_eq!(Sdk::new("tool", "1.0").to_string(), "tool@1.0");
        assert_eq!(Sdk::partial("tool").to_string(), "tool");
    }

    #[test]
    fn test_with_version_completes_partial() {
        let partial = Sdk::partial("tool");
        let full = partial.with_version("2.1");
        assert_eq!(full, Sdk::new("tool", "2.1"));
        assert_eq!(full.version(), Some("2.1"));
    }
}
