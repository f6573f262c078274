//! Catalog client contract.
//!
//! The catalog is the remote registry of candidates and versions. Concrete
//! implementations live outside this crate (see `sdkup-catalog`); the core only
//! depends on this trait so it can be driven by stub catalogs in tests.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use std::fmt;

use crate::archive::ArchiveFormat;
use crate::{Result, Sdk};

/// Byte stream of an archive download.
pub type ByteStream = BoxStream<'static, std::io::Result<Bytes>>;

/// An opened archive download.
///
/// The receiver owns the stream; dropping it closes the underlying connection.
pub struct Download {
    /// Packaging format of the archive.
    pub format: ArchiveFormat,
    /// Archive bytes.
    pub stream: ByteStream,
}

impl Download {
    /// Create a download from a format and a stream.
    #[must_use]
    pub fn new(format: ArchiveFormat, stream: ByteStream) -> Self {
        Self { format, stream }
    }
}

impl fmt::Debug for Download {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Download")
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

/// Remote registry of candidates, versions and archives.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// All known candidate identifiers.
    async fn list_candidates(&self) -> Result<Vec<String>>;

    /// Versions published for `candidate`.
    async fn list_versions(&self, candidate: &str) -> Result<Vec<String>>;

    /// The version installed when none is requested.
    async fn default_version(&self, candidate: &str) -> Result<String>;

    /// Open a download of the archive for a fully qualified target.
    async fn open_download(&self, sdk: &Sdk) -> Result<Download>;
}
