//! Streaming HTTP transfer: one URL to one file on disk.
//!
//! Bodies are written to `{dest}.partial` and renamed into place once the
//! stream completes. A failed transfer never leaves a partial file behind.

use crate::catalog::client::auth_headers;
use crate::catalog::CatalogError;
use crate::config::{Settings, CHUNK_SIZE};
use async_trait::async_trait;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Progress is reported roughly every this many bytes.
const PROGRESS_INTERVAL: u64 = 512 * 1024;

/// Cumulative byte progress of a single transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    pub downloaded: u64,
    /// Declared content length, when the server sent one.
    pub total: Option<u64>,
}

impl DownloadProgress {
    /// Percentage complete, or `None` when the total is unknown.
    pub fn percent(&self) -> Option<u8> {
        match self.total {
            Some(0) | None => None,
            Some(total) => {
                let pct = (self.downloaded as f64 / total as f64) * 100.0;
                Some(pct.clamp(0.0, 100.0) as u8)
            }
        }
    }
}

pub type ProgressFn<'a> = dyn Fn(DownloadProgress) + Send + Sync + 'a;

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("Download request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Download failed: HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Moves bytes from a URL to a file.
#[async_trait]
pub trait Transfer: Send + Sync {
    /// Download `url` into `dest`, returning the number of bytes written.
    async fn download(
        &self,
        url: &str,
        dest: &Path,
        on_progress: &ProgressFn<'_>,
    ) -> Result<u64, DownloadError>;
}

/// Authenticated reqwest-backed transfer.
pub struct HttpTransfer {
    http: reqwest::Client,
}

impl HttpTransfer {
    pub fn new(settings: &Settings) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .default_headers(auth_headers(settings.api_key.as_deref())?)
            .build()
            .map_err(CatalogError::Client)?;
        Ok(Self { http })
    }

    async fn stream_to(
        &self,
        url: &str,
        partial: &Path,
        on_progress: &ProgressFn<'_>,
    ) -> Result<u64, DownloadError> {
        let mut resp = self.http.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(DownloadError::Status(resp.status()));
        }

        let total = resp.content_length();
        let file = std::fs::File::create(partial).map_err(|e| DownloadError::io(partial, e))?;
        let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);
        let mut downloaded: u64 = 0;

        while let Some(chunk) = resp.chunk().await? {
            writer
                .write_all(&chunk)
                .map_err(|e| DownloadError::io(partial, e))?;
            downloaded += chunk.len() as u64;

            if downloaded % PROGRESS_INTERVAL < chunk.len() as u64 {
                on_progress(DownloadProgress { downloaded, total });
            }
        }

        writer.flush().map_err(|e| DownloadError::io(partial, e))?;
        on_progress(DownloadProgress { downloaded, total });
        Ok(downloaded)
    }
}

#[async_trait]
impl Transfer for HttpTransfer {
    async fn download(
        &self,
        url: &str,
        dest: &Path,
        on_progress: &ProgressFn<'_>,
    ) -> Result<u64, DownloadError> {
        let partial = partial_path(dest);
        log::info!("[FETCH] Downloading {} -> {}", url, dest.display());

        let result = match self.stream_to(url, &partial, on_progress).await {
            Ok(bytes) => std::fs::rename(&partial, dest)
                .map(|_| bytes)
                .map_err(|e| DownloadError::io(dest, e)),
            Err(e) => Err(e),
        };

        if result.is_err() && partial.exists() {
            let _ = std::fs::remove_file(&partial);
        }
        result
    }
}

/// `{dest}.partial`, next to the final file.
pub fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    dest.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_with_known_total() {
        let p = DownloadProgress {
            downloaded: 512,
            total: Some(1024),
        };
        assert_eq!(p.percent(), Some(50));
    }

    #[test]
    fn percent_is_none_without_total() {
        let p = DownloadProgress {
            downloaded: 512,
            total: None,
        };
        assert_eq!(p.percent(), None);
        let zero = DownloadProgress {
            downloaded: 0,
            total: Some(0),
        };
        assert_eq!(zero.percent(), None);
    }

    #[test]
    fn percent_never_exceeds_hundred() {
        let p = DownloadProgress {
            downloaded: 2048,
            total: Some(1024),
        };
        assert_eq!(p.percent(), Some(100));
    }

    #[test]
    fn partial_path_sits_beside_destination() {
        let p = partial_path(Path::new("/tmp/x/foo.safetensors"));
        assert_eq!(p, PathBuf::from("/tmp/x/foo.safetensors.partial"));
    }

    #[tokio::test]
    async fn unreachable_host_leaves_no_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("model.safetensors");
        let transfer = HttpTransfer::new(&Settings::default()).unwrap();

        let result = transfer
            .download("http://127.0.0.1:9/file", &dest, &|_| {})
            .await;

        assert!(result.is_err());
        assert!(!dest.exists());
        assert!(!partial_path(&dest).exists());
    }
}
