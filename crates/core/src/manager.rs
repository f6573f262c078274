//! High-level operations behind each CLI command.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::install::Installer;
use crate::resolver::{Resolver, verify_version};
use crate::shell::Exports;
use crate::store::{VersionStore, validate_segment};
use crate::{CandidateCache, Catalog, Config, Error, RefreshOutcome, Result, Sdk, switch};

/// Outcome of a successful install.
#[derive(Debug)]
pub struct Installation {
    /// The installed target.
    pub sdk: Sdk,
    /// Installed payload directory.
    pub path: PathBuf,
    /// What happened to the candidate list before resolution.
    pub refresh: RefreshOutcome,
}

/// A catalog version annotated with local state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionEntry {
    /// Version identifier.
    pub version: String,
    /// Whether the version is installed locally.
    pub installed: bool,
    /// Whether `current` points at this version.
    pub current: bool,
    /// Whether the catalog lists this version.
    pub available: bool,
}

/// Entry point tying configuration, store, candidate cache and catalog together.
pub struct Manager {
    config: Config,
    store: VersionStore,
    candidates: CandidateCache,
    catalog: Arc<dyn Catalog>,
}

impl Manager {
    /// Create a manager for `config`, talking to `catalog`.
    #[must_use]
    pub fn new(config: Config, catalog: Arc<dyn Catalog>) -> Self {
        let store = VersionStore::new(config.root());
        let candidates = CandidateCache::new(config.candidates_file());
        Self {
            config,
            store,
            candidates,
            catalog,
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The version store.
    #[must_use]
    pub fn store(&self) -> &VersionStore {
        &self.store
    }

    /// The candidate cache.
    #[must_use]
    pub fn candidates(&self) -> &CandidateCache {
        &self.candidates
    }

    /// Resolve, install and switch to `sdk`.
    ///
    /// The candidate list is refreshed first; a failed refresh is recorded in
    /// the returned [`Installation`] and resolution proceeds with the cached
    /// list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyInstalled`] without writing anything when the
    /// resolved version is installed, and otherwise any error from resolution,
    /// the install pipeline or the switch.
    #[instrument(skip(self, sdk), fields(sdk = %sdk))]
    pub async fn install(&self, sdk: &Sdk) -> Result<Installation> {
        let refresh = self.candidates.refresh(self.catalog.as_ref()).await;
        self.store.ensure_directories()?;

        let resolver = Resolver::new(self.catalog.as_ref(), &self.candidates);
        let target = match resolver.resolve_sdk(sdk).await {
            Ok(target) => target,
            Err(Error::InvalidCandidate { candidate, .. }) if refresh.is_failed() => {
                return Err(Error::InvalidCandidate {
                    candidate,
                    help: Some(
                        "The candidate list could not be refreshed; check your network connection"
                            .to_string(),
                    ),
                });
            }
            Err(e) => return Err(e),
        };

        if self.store.is_installed(&target) {
            return Err(Error::already_installed(&target));
        }
        if !sdk.is_partial() && !self.store.is_archived(&target) {
            verify_version(self.catalog.as_ref(), &target).await?;
        }

        let installer = Installer::new(self.store.clone(), Arc::clone(&self.catalog));
        let path = installer.install(&target).await?;
        switch::use_version(&self.store, &target)?;

        info!(%target, "Install complete");
        Ok(Installation {
            sdk: target,
            path,
            refresh,
        })
    }

    /// Make the installed `sdk` current.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidCandidate`] if the candidate is unknown.
    /// - [`Error::NotInstalled`] if the version is not installed.
    /// - [`Error::Use`] if the link cannot be switched.
    pub fn use_version(&self, sdk: &Sdk) -> Result<()> {
        let resolver = Resolver::new(self.catalog.as_ref(), &self.candidates);
        resolver.check_candidate(&sdk.candidate)?;
        if sdk.is_partial() {
            return Err(Error::use_failed(sdk, "a version is required"));
        }
        validate_segment("version", &sdk.version)?;
        if !self.store.is_installed(sdk) {
            return Err(Error::not_installed(sdk));
        }
        switch::use_version(&self.store, sdk)
    }

    /// The current version of `candidate`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoCurrent`] if nothing is selected.
    pub fn current(&self, candidate: &str) -> Result<Sdk> {
        validate_segment("candidate", candidate)?;
        self.store
            .current_version(candidate)
            .map(|version| Sdk::new(candidate, version))
            .ok_or_else(|| Error::NoCurrent {
                candidate: candidate.to_string(),
            })
    }

    /// Current versions of every candidate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NothingInUse`] if no candidate has a current version.
    pub fn current_all(&self) -> Result<Vec<Sdk>> {
        let sdks = self.store.current_sdks();
        if sdks.is_empty() {
            return Err(Error::NothingInUse);
        }
        Ok(sdks)
    }

    /// Shell exports for every current version.
    #[must_use]
    pub fn exports(&self) -> Exports {
        Exports::from_store(&self.store)
    }

    /// Candidates offered by the catalog.
    ///
    /// # Errors
    ///
    /// Returns the catalog error if the list cannot be fetched.
    pub async fn list_candidates(&self) -> Result<Vec<String>> {
        self.catalog.list_candidates().await
    }

    /// Versions of `candidate` with local install and current markers.
    ///
    /// Installed versions the catalog no longer lists are appended.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCandidate`] for unknown candidates and the
    /// catalog error if the list cannot be fetched.
    pub async fn list_versions(&self, candidate: &str) -> Result<Vec<VersionEntry>> {
        Resolver::new(self.catalog.as_ref(), &self.candidates).check_candidate(candidate)?;

        let available = self.catalog.list_versions(candidate).await?;
        let mut installed = self.store.installed_versions(candidate);
        let current = self.store.current_version(candidate);
        debug!(%candidate, available = available.len(), installed = installed.len(), "Listing versions");

        let mut entries: Vec<VersionEntry> = available
            .into_iter()
            .map(|version| VersionEntry {
                installed: installed.remove(&version),
                current: current.as_deref() == Some(version.as_str()),
                available: true,
                version,
            })
            .collect();
        entries.extend(installed.into_iter().map(|version| VersionEntry {
            current: current.as_deref() == Some(version.as_str()),
            installed: true,
            available: false,
            version,
        }));
        Ok(entries)
    }

    /// Refresh the cached candidate list.
    pub async fn refresh(&self) -> RefreshOutcome {
        self.candidates.refresh(self.catalog.as_ref()).await
    }
}
