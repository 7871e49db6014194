//! Metadata sidecar: the durable record of one download.
//!
//! ```json
//! {
//!   "download_info": {
//!     "downloaded_at": "2024-05-01T12:00:00+00:00",
//!     "original_url": "https://civitai.com/models/1?modelVersionId=2",
//!     "base_name": "Foo_Bar",
//!     "downloaded_files": { "model_file": "foo.safetensors", "html_info": "Foo_Bar_info.html" }
//!   },
//!   "model": { ... },
//!   "version": { ... }
//! }
//! ```

use crate::catalog::{ModelRecord, VersionRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

pub const METADATA_SUFFIX: &str = "_metadata.json";
pub const HTML_SUFFIX: &str = "_info.html";

#[derive(Debug, thiserror::Error)]
pub enum DocsError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid metadata JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// What was saved for a model. Absent categories are omitted from the JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadedFiles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
}

impl DownloadedFiles {
    pub fn is_empty(&self) -> bool {
        self.model_file.is_none()
            && self.images.is_none()
            && self.html_info.is_none()
            && self.metadata.is_none()
    }

    /// Names of the categories present, in manifest order.
    pub fn categories(&self) -> Vec<&'static str> {
        [
            ("model_file", self.model_file.is_some()),
            ("images", self.images.is_some()),
            ("html_info", self.html_info.is_some()),
            ("metadata", self.metadata.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadInfo {
    #[serde(default)]
    pub downloaded_at: String,
    #[serde(default)]
    pub original_url: Option<String>,
    #[serde(default)]
    pub base_name: String,
    #[serde(default)]
    pub downloaded_files: DownloadedFiles,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataSidecar {
    pub download_info: DownloadInfo,
    #[serde(default)]
    pub model: Value,
    #[serde(default)]
    pub version: Value,
}

pub fn html_file_name(base_name: &str) -> String {
    format!("{}{}", base_name, HTML_SUFFIX)
}

pub fn metadata_file_name(base_name: &str) -> String {
    format!("{}{}", base_name, METADATA_SUFFIX)
}

/// Write `{base_name}_info.html` into `target_dir`.
pub fn save_html_info(html: &str, target_dir: &Path, base_name: &str) -> Result<PathBuf, DocsError> {
    let path = target_dir.join(html_file_name(base_name));
    std::fs::write(&path, html).map_err(|source| DocsError::Io {
        path: path.clone(),
        source,
    })?;
    log::info!("[DOCS] Saved HTML info page to {}", path.display());
    Ok(path)
}

/// Write `{base_name}_metadata.json` into `target_dir`, stamped with the
/// current UTC time.
pub fn save_metadata(
    model: &ModelRecord,
    version: &VersionRecord,
    target_dir: &Path,
    base_name: &str,
    original_url: Option<&str>,
    downloaded_files: &DownloadedFiles,
) -> Result<PathBuf, DocsError> {
    let sidecar = MetadataSidecar {
        download_info: DownloadInfo {
            downloaded_at: chrono::Utc::now().to_rfc3339(),
            original_url: original_url.map(str::to_string),
            base_name: base_name.to_string(),
            downloaded_files: downloaded_files.clone(),
        },
        model: model.raw().clone(),
        version: version.raw().clone(),
    };

    let path = target_dir.join(metadata_file_name(base_name));
    let json = serde_json::to_string_pretty(&sidecar).map_err(|source| DocsError::Json {
        path: path.clone(),
        source,
    })?;
    std::fs::write(&path, json).map_err(|source| DocsError::Io {
        path: path.clone(),
        source,
    })?;

    log::info!("[DOCS] Saved metadata to {}", path.display());
    Ok(path)
}

pub fn load_metadata(path: &Path) -> Result<MetadataSidecar, DocsError> {
    let text = std::fs::read_to_string(path).map_err(|source| DocsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| DocsError::Json {
        path: path.to_path_buf(),
        source,
    })
}
