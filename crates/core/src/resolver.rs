//! Turning user input into a fully qualified target.

use tracing::debug;

use crate::store::validate_segment;
use crate::{CandidateCache, Catalog, Error, Result, Sdk};

/// Resolves `candidate[@version]` against the cached candidate list and the catalog.
///
/// Resolution is a pure lookup: the only network call is the default-version
/// query when no version is given. Whether the target is already installed is
/// checked by the caller.
pub struct Resolver<'a> {
    catalog: &'a dyn Catalog,
    candidates: &'a CandidateCache,
}

impl<'a> Resolver<'a> {
    /// Create a resolver.
    #[must_use]
    pub fn new(catalog: &'a dyn Catalog, candidates: &'a CandidateCache) -> Self {
        Self {
            catalog,
            candidates,
        }
    }

    /// Resolve `candidate` and an optional version.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidCandidate`] if the candidate is not in the cached list.
    /// - [`Error::Resolution`] if no version was given and the catalog cannot
    ///   supply a default.
    /// - [`Error::InvalidPath`] if the version is unsafe as a path segment.
    pub async fn resolve(&self, candidate: &str, version: Option<&str>) -> Result<Sdk> {
        self.check_candidate(candidate)?;

        let version = match version.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => v.to_string(),
            None => self.default_version(candidate).await?,
        };
        validate_segment("version", &version)?;

        let sdk = Sdk::new(candidate, version);
        debug!(%sdk, "Resolved target");
        Ok(sdk)
    }

    /// Resolve a possibly partial [`Sdk`].
    ///
    /// # Errors
    ///
    /// See [`Resolver::resolve`].
    pub async fn resolve_sdk(&self, sdk: &Sdk) -> Result<Sdk> {
        self.resolve(&sdk.candidate, sdk.version()).await
    }

    /// Fail with [`Error::InvalidCandidate`] unless `candidate` is known.
    ///
    /// # Errors
    ///
    /// Returns an error if the candidate is unknown or the cache is unreadable.
    pub fn check_candidate(&self, candidate: &str) -> Result<()> {
        if validate_segment("candidate", candidate).is_err()
            || !self.candidates.contains(candidate)?
        {
            return Err(Error::invalid_candidate(candidate));
        }
        Ok(())
    }

    async fn default_version(&self, candidate: &str) -> Result<String> {
        let version = self
            .catalog
            .default_version(candidate)
            .await
            .map_err(|e| Error::resolution(candidate, e.to_string()))?;
        let version = version.trim();
        if version.is_empty() {
            return Err(Error::resolution(
                candidate,
                "catalog returned no default version",
            ));
        }
        debug!(%candidate, %version, "Using catalog default version");
        Ok(version.to_string())
    }
}

/// Fail with [`Error::InvalidVersion`] unless the catalog lists `sdk.version`.
///
/// # Errors
///
/// Returns [`Error::Resolution`] if the version list cannot be fetched.
pub async fn verify_version(catalog: &dyn Catalog, sdk: &Sdk) -> Result<()> {
    let versions = catalog
        .list_versions(&sdk.candidate)
        .await
        .map_err(|e| Error::resolution(&sdk.candidate, e.to_string()))?;
    if versions.iter().any(|v| v == &sdk.version) {
        Ok(())
    } else {
        Err(Error::invalid_version(sdk))
    }
}
