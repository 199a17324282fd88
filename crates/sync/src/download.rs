//! Download seam between the synchronizer and the network.
//!
//! The engine only depends on the [`Downloader`] trait; the host
//! supplies [`HttpDownloader`] or a test double.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tracing::debug;

/// Errors from fetching remote bytes.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(String),
}

/// Abstract capability to fetch bytes from a URL into a local file.
pub trait Downloader: Send + Sync {
    /// Fetches `url` into `dest_dir/filename` and returns the written path.
    ///
    /// Creates `dest_dir` if necessary.
    fn fetch<'a>(
        &'a self,
        url: &'a str,
        dest_dir: &'a Path,
        filename: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<PathBuf, DownloadError>> + Send + 'a>>;
}

/// HTTP downloader backed by a shared reqwest client.
pub struct HttpDownloader {
    client: reqwest::Client,
}

impl HttpDownloader {
    /// Creates a new downloader with the given HTTP client.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Downloader for HttpDownloader {
    fn fetch<'a>(
        &'a self,
        url: &'a str,
        dest_dir: &'a Path,
        filename: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<PathBuf, DownloadError>> + Send + 'a>> {
        Box::pin(async move {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| DownloadError::Http(format!("failed to download {url}: {e}")))?;

            if !response.status().is_success() {
                return Err(DownloadError::Http(format!(
                    "download {url} returned status {}",
                    response.status()
                )));
            }

            let data = response
                .bytes()
                .await
                .map_err(|e| DownloadError::Http(format!("failed to read response from {url}: {e}")))?;

            tokio::fs::create_dir_all(dest_dir).await?;
            let dest = dest_dir.join(filename);
            tokio::fs::write(&dest, &data).await?;

            debug!(url, path = %dest.display(), bytes = data.len(), "fetched remote file");
            Ok(dest)
        })
    }
}
