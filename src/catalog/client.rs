//! CivitAI REST client: model and version lookups.
//!
//! Two sequential authenticated GETs per lookup: the model by id, then the
//! requested version (or the first listed one). Every failure is logged and
//! folded into `None` at this boundary so one bad model never stops a batch.

use super::types::{ModelRecord, VersionRecord};
use crate::config::Settings;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

/// Source of model + version records consumed by the pipeline.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Returns `None` when either record cannot be obtained.
    async fn fetch_model_info(
        &self,
        model_id: &str,
        version_id: Option<&str>,
    ) -> Option<(ModelRecord, VersionRecord)>;
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Malformed catalog payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("No versions found for model {0}")]
    NoVersions(String),

    #[error("Invalid API key header: {0}")]
    InvalidKey(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// HTTP client for the public CivitAI v1 API.
pub struct CivitaiClient {
    http: reqwest::Client,
    base_url: String,
}

impl CivitaiClient {
    pub fn new(settings: &Settings) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .default_headers(auth_headers(settings.api_key.as_deref())?)
            .build()
            .map_err(CatalogError::Client)?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json(&self, url: &str) -> Result<Value, CatalogError> {
        log::info!("[CATALOG] GET {}", url);

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| CatalogError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                url: url.to_string(),
                status,
            });
        }

        resp.json::<Value>()
            .await
            .map_err(|source| CatalogError::Transport {
                url: url.to_string(),
                source,
            })
    }

    /// Fallible lookup; `fetch_model_info` wraps this and logs the error.
    pub async fn try_fetch(
        &self,
        model_id: &str,
        version_id: Option<&str>,
    ) -> Result<(ModelRecord, VersionRecord), CatalogError> {
        let model_url = format!("{}/models/{}", self.base_url, model_id);
        let model = ModelRecord::from_value(self.get_json(&model_url).await?)?;

        let version_id = match version_id {
            Some(id) => id.to_string(),
            None => {
                let latest = model
                    .latest_version_id()
                    .ok_or_else(|| CatalogError::NoVersions(model_id.to_string()))?;
                log::info!("[CATALOG] Using latest version: {}", latest);
                latest.to_string()
            }
        };

        let version_url = format!("{}/model-versions/{}", self.base_url, version_id);
        let version = VersionRecord::from_value(self.get_json(&version_url).await?)?;

        Ok((model, version))
    }
}

#[async_trait]
impl CatalogApi for CivitaiClient {
    async fn fetch_model_info(
        &self,
        model_id: &str,
        version_id: Option<&str>,
    ) -> Option<(ModelRecord, VersionRecord)> {
        match self.try_fetch(model_id, version_id).await {
            Ok(records) => Some(records),
            Err(e) => {
                log::error!(
                    "[CATALOG] Lookup failed for model {} (version {}): {}",
                    model_id,
                    version_id.unwrap_or("latest"),
                    e
                );
                None
            }
        }
    }
}

/// Default headers carrying the bearer token, shared by catalog and file
/// downloads. An absent key yields no `Authorization` header at all.
pub fn auth_headers(api_key: Option<&str>) -> Result<HeaderMap, CatalogError> {
    let mut headers = HeaderMap::new();
    if let Some(key) = api_key.filter(|k| !k.is_empty()) {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", key))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_headers_include_bearer_token() {
        let headers = auth_headers(Some("abc123")).unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc123");
    }

    #[test]
    fn auth_headers_empty_without_key() {
        assert!(auth_headers(None).unwrap().is_empty());
        assert!(auth_headers(Some("")).unwrap().is_empty());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let settings = Settings::default().with_base_url("https://example.test/api/v1/");
        let client = CivitaiClient::new(&settings).unwrap();
        assert_eq!(client.base_url, "https://example.test/api/v1");
    }

    #[tokio::test]
    async fn unreachable_catalog_yields_none() {
        let settings = Settings::default().with_base_url("http://127.0.0.1:9/api/v1");
        let client = CivitaiClient::new(&settings).unwrap();
        assert!(client.fetch_model_info("123", None).await.is_none());
    }
}
