//! Concurrent acquire/extract install pipeline.
//!
//! Two units cooperate through typed one-shot signals:
//!
//! - the *acquire* unit produces a complete archive on disk (either a cached
//!   one or a fresh download) and reports it on the archive signal;
//! - the *extraction* unit is started before acquisition, waits on the archive
//!   signal and unpacks the archive into the version directory. Its join
//!   result is the install signal.
//!
//! Every failure is carried through the signals, so a unit that gives up never
//! leaves the other waiting.

use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::archive::{self, ArchiveFormat};
use crate::catalog::ByteStream;
use crate::store::{ArchivedFile, VersionStore};
use crate::{Catalog, Error, Result, Sdk};

type ArchiveSignal = oneshot::Sender<Result<ArchivedFile>>;

/// Drives the acquire and extraction units for one target.
pub struct Installer {
    store: VersionStore,
    catalog: Arc<dyn Catalog>,
}

impl Installer {
    /// Create an installer over `store`, downloading from `catalog`.
    #[must_use]
    pub fn new(store: VersionStore, catalog: Arc<dyn Catalog>) -> Self {
        Self { store, catalog }
    }

    /// Materialise `sdk` as an installed directory and return its path.
    ///
    /// A cached archive is reused without opening a download.
    ///
    /// # Errors
    ///
    /// - The catalog's error, unchanged, if the download cannot be opened.
    /// - [`Error::Download`] if the download stream fails.
    ///
    /// No archive is left behind in either case.
    /// - [`Error::InstallFailed`] if the archive cannot be extracted. The
    ///   archive is kept so a retry can reuse it.
    #[instrument(skip(self, sdk), fields(sdk = %sdk))]
    pub async fn install(&self, sdk: &Sdk) -> Result<PathBuf> {
        let dest = self.store.version_dir(sdk)?;
        let (archive_tx, archive_rx) = oneshot::channel();
        let extraction = spawn_extraction(sdk.clone(), dest, archive_rx);

        let acquisition = match self.store.find_archive(sdk) {
            Some(cached) => {
                info!(path = ?cached.path, "Reusing cached archive");
                let _ = archive_tx.send(Ok(cached));
                None
            }
            None => match self.catalog.open_download(sdk).await {
                Ok(download) => {
                    info!(format = %download.format, "Downloading archive");
                    let path = self.store.archive_path(sdk, download.format)?;
                    Some(spawn_acquire(
                        sdk.clone(),
                        path,
                        download.format,
                        download.stream,
                        archive_tx,
                    ))
                }
                Err(e) => {
                    // The extractor exits on its own once it sees the failure.
                    let _ = archive_tx.send(Err(Error::download(sdk, e.to_string())));
                    return Err(e);
                }
            },
        };

        join_units(sdk, extraction, acquisition).await
    }
}

/// Wait for the install signal, then for the acquire unit.
///
/// If the extraction task itself dies, the acquire unit is aborted so no
/// download outlives the install.
async fn join_units(
    sdk: &Sdk,
    extraction: JoinHandle<Result<PathBuf>>,
    acquisition: Option<JoinHandle<()>>,
) -> Result<PathBuf> {
    let installed = match extraction.await {
        Ok(installed) => installed,
        Err(e) => {
            if let Some(handle) = acquisition {
                handle.abort();
                let _ = handle.await;
            }
            return Err(Error::install_failed(
                sdk,
                format!("extraction task failed: {e}"),
            ));
        }
    };

    if let Some(handle) = acquisition
        && let Err(e) = handle.await
    {
        warn!(error = %e, "Acquire task did not finish cleanly");
    }

    let path = installed?;
    info!(?path, "Installed");
    Ok(path)
}

fn spawn_extraction(
    sdk: Sdk,
    dest: PathBuf,
    archive_rx: oneshot::Receiver<Result<ArchivedFile>>,
) -> JoinHandle<Result<PathBuf>> {
    tokio::spawn(async move {
        let archived = match archive_rx.await {
            Ok(result) => result?,
            Err(_) => return Err(Error::download(&sdk, "archive producer stopped")),
        };

        debug!(path = ?archived.path, "Archive ready, extracting");
        let target = sdk.clone();
        let unpacked = tokio::task::spawn_blocking(move || {
            archive::unpack_into(&archived.path, archived.format, &dest)
        })
        .await
        .map_err(|e| Error::install_failed(&target, format!("extraction task failed: {e}")))?;

        unpacked.map_err(|e| Error::install_failed(&sdk, e.to_string()))
    })
}

fn spawn_acquire(
    sdk: Sdk,
    path: PathBuf,
    format: ArchiveFormat,
    stream: ByteStream,
    archive_tx: ArchiveSignal,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let result = save_archive(&sdk, &path, stream)
            .await
            .map(|()| ArchivedFile { path, format });
        if let Err(e) = &result {
            warn!(sdk = %sdk, error = %e, "Archive acquisition failed");
        }
        let _ = archive_tx.send(result);
    })
}

/// Stream `stream` into `path`, publishing the file only once it is complete.
///
/// Bytes go to a hidden `.part` sibling which is renamed into place after the
/// last chunk; on any error the partial file is removed.
///
/// # Errors
///
/// Returns [`Error::Download`] if the stream fails or yields no bytes, and an
/// I/O error if the file cannot be written.
pub async fn save_archive(sdk: &Sdk, path: &Path, mut stream: ByteStream) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| Error::download(sdk, "archive path has no parent directory"))?;
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| Error::io(e, dir, "create archive directory"))?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::download(sdk, "archive path has no file name"))?;
    let partial = PartialFile::new(dir.join(format!(".{file_name}.part")));

    let mut file = tokio::fs::File::create(partial.path())
        .await
        .map_err(|e| Error::io(e, partial.path(), "create archive"))?;

    let mut total_bytes = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| Error::download(sdk, e.to_string()))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| Error::io(e, partial.path(), "write archive"))?;
        total_bytes += chunk.len() as u64;
    }
    if total_bytes == 0 {
        return Err(Error::download(sdk, "server returned an empty archive"));
    }

    file.flush()
        .await
        .map_err(|e| Error::io(e, partial.path(), "flush archive"))?;
    file.sync_all()
        .await
        .map_err(|e| Error::io(e, partial.path(), "sync archive"))?;
    drop(file);

    partial.commit(path).await?;
    debug!(bytes_written = total_bytes, ?path, "Archive saved");
    Ok(())
}

/// A download in progress; removed on drop unless committed.
struct PartialFile {
    path: PathBuf,
    committed: bool,
}

impl PartialFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            committed: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    async fn commit(mut self, dest: &Path) -> Result<()> {
        tokio::fs::rename(&self.path, dest)
            .await
            .map_err(|e| Error::io(e, dest, "publish archive"))?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}
