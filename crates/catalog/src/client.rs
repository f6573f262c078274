//! HTTP implementation of the catalog contract.

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::header::LOCATION;
use reqwest::{Client, Response, StatusCode, redirect};
use sdkup_core::candidates::split_list;
use sdkup_core::{ArchiveFormat, Catalog, Download, Error, Result, Sdk};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::Platform;

/// Response header carrying the archive type of a download.
const ARCHIVE_TYPE_HEADER: &str = "X-Sdkman-ArchiveType";

/// Redirects followed by a download before giving up.
const MAX_REDIRECTS: usize = 10;

/// Catalog client for an sdkman-compatible broker.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: Client,
    /// Broker client that surfaces redirects so their headers can be read.
    download_client: Client,
    base_url: String,
    platform: String,
}

impl HttpCatalog {
    /// Create a client for `base_url` using the current platform.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = client_builder()
            .build()
            .map_err(|e| Error::configuration(format!("failed to create HTTP client: {e}")))?;
        let download_client = client_builder()
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| Error::configuration(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            download_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            platform: Platform::current().catalog_id().to_string(),
        })
    }

    /// Override the platform identifier sent to the catalog.
    #[must_use]
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    /// The platform identifier used in requests.
    #[must_use]
    pub fn platform(&self) -> &str {
        &self.platform
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> std::result::Result<Response, String> {
        let url = self.url(path);
        debug!(%url, "Catalog request");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("GET {url}: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("GET {url}: HTTP {status}"));
        }
        Ok(response)
    }

    /// Request a download, following redirects by hand.
    ///
    /// The broker announces the archive type on the redirect, not on the
    /// file it points to, so the first header seen on any hop wins.
    async fn follow_download(
        &self,
        url: &str,
    ) -> std::result::Result<(Response, Option<ArchiveFormat>), String> {
        let mut url = reqwest::Url::parse(url).map_err(|e| format!("invalid URL {url}: {e}"))?;
        let mut announced = None;

        for _ in 0..=MAX_REDIRECTS {
            debug!(%url, "Download request");
            let response = self
                .download_client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| format!("GET {url}: {e}"))?;
            announced = announced.or_else(|| header_format(&response));

            let status = response.status();
            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| format!("GET {url}: HTTP {status} without a location"))?;
                url = url
                    .join(location)
                    .map_err(|e| format!("GET {url}: invalid redirect {location}: {e}"))?;
                continue;
            }
            if !status.is_success() {
                return Err(format!("GET {url}: HTTP {status}"));
            }
            return Ok((response, announced));
        }

        Err(format!("GET {url}: too many redirects"))
    }

    async fn get_text(&self, path: &str) -> Result<String> {
        let response = self.get(path).await.map_err(Error::catalog)?;
        response
            .text()
            .await
            .map_err(|e| Error::catalog(format!("failed to read response body: {e}")))
    }
}

#[async_trait]
impl Catalog for HttpCatalog {
    async fn list_candidates(&self) -> Result<Vec<String>> {
        Ok(split_list(&self.get_text("candidates/all").await?))
    }

    async fn list_versions(&self, candidate: &str) -> Result<Vec<String>> {
        let path = format!("candidates/{candidate}/{}/versions/all", self.platform);
        Ok(split_list(&self.get_text(&path).await?))
    }

    async fn default_version(&self, candidate: &str) -> Result<String> {
        let body = self
            .get_text(&format!("candidates/default/{candidate}"))
            .await?;
        Ok(body.trim().to_string())
    }

    #[instrument(skip(self, sdk), fields(sdk = %sdk, platform = %self.platform))]
    async fn open_download(&self, sdk: &Sdk) -> Result<Download> {
        let path = format!(
            "broker/download/{}/{}/{}",
            sdk.candidate, sdk.version, self.platform
        );
        let (response, header_format) = self
            .follow_download(&self.url(&path))
            .await
            .map_err(|message| Error::download(sdk, message))?;
        if response.status() == StatusCode::NO_CONTENT {
            return Err(Error::download(sdk, "catalog returned no archive"));
        }

        let format = header_format
            .or_else(|| ArchiveFormat::from_name(response.url().path()))
            .unwrap_or(ArchiveFormat::Zip);
        debug!(%format, url = %response.url(), "Download opened");

        let stream = response
            .bytes_stream()
            .map_err(std::io::Error::other)
            .boxed();
        Ok(Download::new(format, stream))
    }
}

fn client_builder() -> reqwest::ClientBuilder {
    Client::builder()
        .user_agent(concat!("sdkup/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(30))
}

/// Archive format announced by the archive-type header, if any.
fn header_format(response: &Response) -> Option<ArchiveFormat> {
    response
        .headers()
        .get(ARCHIVE_TYPE_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(ArchiveFormat::parse)
}
