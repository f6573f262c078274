//! Archive formats and all-or-nothing extraction.
//!
//! Archives are unpacked into a hidden staging directory next to the
//! destination and renamed into place only once every entry has been written,
//! so a failed or interrupted extraction never leaves a partially-populated
//! version directory behind.

use flate2::read::GzDecoder;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::{Error, Result};

/// Extensions recognised in the archive cache, in lookup order.
pub const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "tar.gz", "tgz", "tar"];

/// Mode of a version directory that does not come from the archive itself.
#[cfg(unix)]
const INSTALL_DIR_MODE: u32 = 0o755;

/// Packaging format of a candidate archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    /// Zip archive.
    Zip,
    /// Gzip-compressed tarball.
    TarGz,
    /// Uncompressed tarball.
    Tar,
}

impl ArchiveFormat {
    /// File extension used for cached archives of this format.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::TarGz => "tar.gz",
            Self::Tar => "tar",
        }
    }

    /// Parse a format identifier such as `zip`, `tar.gz` or `tgz`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "zip" => Some(Self::Zip),
            "tar.gz" | "tgz" | "gz" => Some(Self::TarGz),
            "tar" => Some(Self::Tar),
            _ => None,
        }
    }

    /// Detect the format from a file name or URL path.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.split(['?', '#']).next().unwrap_or(name).to_lowercase();
        if name.ends_with(".zip") {
            Some(Self::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".tar") {
            Some(Self::Tar)
        } else {
            None
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Unpack `archive` into `dest`.
///
/// `dest` must not exist yet. If the archive holds a single top-level
/// directory, that directory becomes `dest`.
///
/// # Errors
///
/// Returns an error if the archive cannot be read, is empty, or the staged
/// payload cannot be moved into place. Nothing is left at `dest` on error.
pub fn unpack_into(archive: &Path, format: ArchiveFormat, dest: &Path) -> Result<PathBuf> {
    let parent = dest
        .parent()
        .ok_or_else(|| Error::archive(archive, "destination has no parent directory"))?;
    std::fs::create_dir_all(parent)
        .map_err(|e| Error::io(e, parent, "create version parent directory"))?;

    // Dropping the guard removes whatever is left of the staging tree.
    let staging = tempfile::Builder::new()
        .prefix(".staging-")
        .tempdir_in(parent)
        .map_err(|e| Error::io(e, parent, "create staging directory"))?;

    debug!(?archive, %format, staging = ?staging.path(), "Unpacking archive");
    match format {
        ArchiveFormat::Zip => unpack_zip(archive, staging.path())?,
        ArchiveFormat::TarGz => {
            let file = open(archive)?;
            unpack_tar(tar::Archive::new(GzDecoder::new(file)), archive, staging.path())?;
        }
        ArchiveFormat::Tar => {
            let file = open(archive)?;
            unpack_tar(tar::Archive::new(file), archive, staging.path())?;
        }
    }

    let payload = payload_root(staging.path())?;
    if is_empty_dir(&payload)? {
        return Err(Error::archive(archive, "archive contains no files"));
    }

    // The staging dir is created owner-only; it becomes the version dir when
    // the archive has several top-level entries.
    #[cfg(unix)]
    if payload == staging.path() {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&payload, std::fs::Permissions::from_mode(INSTALL_DIR_MODE))
            .map_err(|e| Error::io(e, &payload, "set version directory permissions"))?;
    }

    std::fs::rename(&payload, dest).map_err(|e| Error::io(e, dest, "move staged payload"))?;
    debug!(?dest, "Archive unpacked");
    Ok(dest.to_path_buf())
}

fn open(archive: &Path) -> Result<File> {
    File::open(archive).map_err(|e| Error::io(e, archive, "open archive"))
}

fn unpack_tar<R: io::Read>(mut tarball: tar::Archive<R>, archive: &Path, dest: &Path) -> Result<()> {
    tarball.set_preserve_permissions(true);
    tarball
        .unpack(dest)
        .map_err(|e| Error::archive(archive, format!("failed to extract tar: {e}")))
}

fn unpack_zip(archive: &Path, dest: &Path) -> Result<()> {
    let mut zip = zip::ZipArchive::new(open(archive)?)
        .map_err(|e| Error::archive(archive, format!("failed to open zip: {e}")))?;

    for i in 0..zip.len() {
        let mut entry = zip
            .by_index(i)
            .map_err(|e| Error::archive(archive, format!("failed to read zip entry: {e}")))?;

        // Entries escaping the destination are skipped.
        let Some(relative) = entry.enclosed_name() else {
            trace!(name = entry.name(), "Skipping unsafe zip entry");
            continue;
        };
        let outpath = dest.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&outpath)
                .map_err(|e| Error::io(e, &outpath, "create directory"))?;
            continue;
        }

        if let Some(p) = outpath.parent() {
            std::fs::create_dir_all(p).map_err(|e| Error::io(e, p, "create directory"))?;
        }
        let mut out =
            File::create(&outpath).map_err(|e| Error::io(e, &outpath, "create file"))?;
        io::copy(&mut entry, &mut out)
            .map_err(|e| Error::archive(archive, format!("failed to extract {}: {e}", entry.name())))?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))
                .map_err(|e| Error::io(e, &outpath, "set permissions"))?;
        }
    }

    Ok(())
}

/// The directory whose contents become the version directory.
fn payload_root(staging: &Path) -> Result<PathBuf> {
    let mut entries = std::fs::read_dir(staging)
        .map_err(|e| Error::io(e, staging, "read staging directory"))?
        .collect::<io::Result<Vec<_>>>()
        .map_err(|e| Error::io(e, staging, "read staging directory"))?;

    if entries.len() == 1 {
        let entry = entries.remove(0);
        let file_type = entry
            .file_type()
            .map_err(|e| Error::io(e, &entry.path(), "inspect staged entry"))?;
        if file_type.is_dir() {
            return Ok(entry.path());
        }
    }
    Ok(staging.to_path_buf())
}

fn is_empty_dir(dir: &Path) -> Result<bool> {
    let mut entries =
        std::fs::read_dir(dir).map_err(|e| Error::io(e, dir, "read staged payload"))?;
    Ok(entries.next().is_none())
}
