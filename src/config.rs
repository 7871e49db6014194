//! Runtime settings: read from the environment (and a local `.env`).
//!
//! | Variable             | Default                       |
//! |----------------------|-------------------------------|
//! | `CIVITAI_API_KEY`    | unset (anonymous requests)    |
//! | `CIVITAI_BASE_URL`   | `https://civitai.com/api/v1`  |
//! | `CIVITAI_MODEL_DIR`  | `$HOME/Models`                |
//! | `CIVITAI_MAX_IMAGES` | `3`                           |

use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://civitai.com/api/v1";
pub const DEFAULT_MAX_PREVIEW_IMAGES: usize = 3;

/// Write-buffer size used when streaming response bodies to disk.
pub const CHUNK_SIZE: usize = 8192;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a non-negative integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Root of the organised model library.
    pub base_dir: PathBuf,
    pub max_preview_images: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            base_dir: default_base_dir(),
            max_preview_images: DEFAULT_MAX_PREVIEW_IMAGES,
        }
    }
}

impl Settings {
    /// Load settings from the process environment, merging `.env` first.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            log::info!("[CONFIG] Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = Self::default();

        settings.api_key = get("CIVITAI_API_KEY");
        if let Some(url) = get("CIVITAI_BASE_URL") {
            settings.base_url = url;
        }
        if let Some(dir) = get("CIVITAI_MODEL_DIR") {
            settings.base_dir = PathBuf::from(dir);
        }
        if let Some(raw) = get("CIVITAI_MAX_IMAGES") {
            settings.max_preview_images =
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidNumber {
                        var: "CIVITAI_MAX_IMAGES",
                        value: raw.clone(),
                    })?;
        }

        Ok(settings)
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn with_max_images(mut self, max: usize) -> Self {
        self.max_preview_images = max;
        self
    }

    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key;
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

fn default_base_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Models")
}
