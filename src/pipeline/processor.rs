//! Per-model orchestration and the batch loop.
//!
//! One model moves through fetch → classify → route → download → document →
//! persist. Only a catalog miss (or a target directory that cannot be
//! created) fails the model; everything after routing is best-effort and
//! shows up as absent entries in the manifest.

use super::observer::{phase, scale, LogLevel, NoopObserver, PipelineObserver};
use super::reference::BatchItem;
use crate::catalog::{CatalogApi, CatalogError, CivitaiClient};
use crate::classify::ClassificationPolicy;
use crate::config::Settings;
use crate::docs::{self, DownloadedFiles};
use crate::fetch::{self, DownloadProgress, HttpTransfer, Transfer};
use crate::routing;
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const FETCH_FAILED: &str = "Failed to fetch model information.";

/// Outcome of one batch item. Never mutated after creation.
#[derive(Debug, Clone, Default)]
pub struct DownloadResult {
    pub success: bool,
    pub model_name: Option<String>,
    pub model_id: Option<String>,
    pub version_id: Option<String>,
    pub target_directory: Option<PathBuf>,
    pub downloaded_files: DownloadedFiles,
    /// Folder name and file prefix, `{name}_{model id}_{version id}`.
    pub base_name: Option<String>,
    pub error: Option<String>,
    /// The raw batch item, for items that never reached the pipeline.
    pub item: Option<String>,
}

impl DownloadResult {
    pub fn failed(error: impl Into<String>, model_id: &str, version_id: Option<&str>) -> Self {
        Self {
            model_id: Some(model_id.to_string()),
            version_id: version_id.map(str::to_string),
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn invalid(item: &BatchItem, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            item: Some(item.to_string()),
            ..Default::default()
        }
    }

    /// Short label for summaries: model id, else the raw item.
    pub fn label(&self) -> &str {
        self.model_id
            .as_deref()
            .or(self.item.as_deref())
            .unwrap_or("Unknown")
    }
}

pub struct Pipeline {
    catalog: Arc<dyn CatalogApi>,
    transfer: Arc<dyn Transfer>,
    settings: Settings,
    policy: ClassificationPolicy,
    observer: Arc<dyn PipelineObserver>,
    cancel: Arc<AtomicBool>,
}

impl Pipeline {
    pub fn new(catalog: Arc<dyn CatalogApi>, transfer: Arc<dyn Transfer>, settings: Settings) -> Self {
        Self {
            catalog,
            transfer,
            settings,
            policy: ClassificationPolicy::default(),
            observer: Arc::new(NoopObserver),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Pipeline backed by the live catalog and HTTP transfer.
    pub fn from_settings(settings: Settings) -> Result<Self, CatalogError> {
        if !settings.has_api_key() {
            log::warn!("[PIPELINE] CIVITAI_API_KEY is not set; some models may refuse to download");
        }
        let catalog = Arc::new(CivitaiClient::new(&settings)?);
        let transfer = Arc::new(HttpTransfer::new(&settings)?);
        Ok(Self::new(catalog, transfer, settings))
    }

    pub fn with_policy(mut self, policy: ClassificationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    fn note(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Info => log::info!("[PIPELINE] {}", message),
            LogLevel::Warning => log::warn!("[PIPELINE] {}", message),
            LogLevel::Error => log::error!("[PIPELINE] {}", message),
        }
        self.observer.on_log(level, message);
    }

    /// Run the full pipeline for one model.
    pub async fn process(
        &self,
        model_id: &str,
        version_id: Option<&str>,
        original_url: Option<&str>,
    ) -> DownloadResult {
        let obs = &self.observer;
        self.note(
            LogLevel::Info,
            &format!("Processing model {} (version: {})", model_id, version_id.unwrap_or("latest")),
        );

        // Fetching
        obs.on_progress(phase::FETCHING, "Fetching model information...");
        let Some((model, version)) = self.catalog.fetch_model_info(model_id, version_id).await else {
            self.note(LogLevel::Error, &format!("Model {}: {}", model_id, FETCH_FAILED));
            return DownloadResult::failed(FETCH_FAILED, model_id, version_id);
        };

        // Classifying + routing
        obs.on_progress(phase::ROUTING, "Preparing directories...");
        let model_name = model.display_name(model_id);
        let base_name = routing::model_folder_name(&model_name, model_id, version.id);
        let model_type = model.model_type.route_key();
        let key = self.policy.classify(&model, &version);

        self.note(
            LogLevel::Info,
            &format!("{}: type {}, base model {}", model_name, model.model_type, key),
        );

        let target_dir =
            match routing::resolve_target_dir(&self.settings.base_dir, &model_type, key, &base_name) {
                Ok(dir) => dir,
                Err(e) => {
                    let msg = format!("Failed to create target directory for {}: {}", model_name, e);
                    self.note(LogLevel::Error, &msg);
                    let mut result = DownloadResult::failed(msg, model_id, version_id);
                    result.model_name = Some(model_name);
                    return result;
                }
            };

        let mut files = DownloadedFiles::default();
        let mut images: Vec<PathBuf> = Vec::new();

        // Downloading
        if self.is_cancelled() {
            self.note(LogLevel::Warning, "Cancelled, skipping downloads");
        } else {
            obs.on_progress(phase::MODEL_FILE, "Downloading model file...");
            let on_model = |p: DownloadProgress| {
                obs.on_transfer(p);
                if let Some(pct) = p.percent() {
                    obs.on_progress(scale(phase::MODEL_FILE, phase::IMAGES, pct), "Downloading model file...");
                }
            };
            files.model_file =
                fetch::fetch_model_file(self.transfer.as_ref(), &version, &target_dir, &on_model).await;
            if files.model_file.is_none() {
                self.note(LogLevel::Warning, &format!("No model file saved for {}", model_name));
            }

            if self.is_cancelled() {
                self.note(LogLevel::Warning, "Cancelled, skipping preview images");
            } else {
                obs.on_progress(phase::IMAGES, "Downloading preview images...");
                let on_image = |p: DownloadProgress| obs.on_transfer(p);
                images = fetch::fetch_images(
                    self.transfer.as_ref(),
                    &version,
                    &target_dir,
                    self.settings.max_preview_images,
                    &on_image,
                )
                .await;
                if !images.is_empty() {
                    files.images = Some(
                        images
                            .iter()
                            .filter_map(|p| p.file_name())
                            .map(|n| n.to_string_lossy().into_owned())
                            .collect(),
                    );
                }
            }
        }

        // Documenting
        obs.on_progress(phase::DOCUMENTING, "Generating documentation...");
        let html = docs::render(&model, &version, &target_dir, &images, original_url);
        match docs::save_html_info(&html, &target_dir, &base_name) {
            Ok(path) => files.html_info = file_name(&path),
            Err(e) => self.note(LogLevel::Error, &format!("Failed to save HTML info page: {}", e)),
        }

        // Persisting
        obs.on_progress(phase::METADATA, "Saving metadata...");
        match docs::save_metadata(&model, &version, &target_dir, &base_name, original_url, &files) {
            Ok(path) => files.metadata = file_name(&path),
            Err(e) => self.note(LogLevel::Error, &format!("Failed to save metadata: {}", e)),
        }

        obs.on_progress(phase::DONE, &format!("Completed: {}", model_name));
        self.note(LogLevel::Info, &format!("Successfully processed model: {}", model_name));

        DownloadResult {
            success: true,
            model_name: Some(model_name),
            model_id: Some(model_id.to_string()),
            version_id: Some(version.id.to_string()),
            target_directory: Some(target_dir),
            downloaded_files: files,
            base_name: Some(base_name),
            error: None,
            item: None,
        }
    }

    /// Resolve and process one batch item. A panic inside the pipeline
    /// becomes a failed result for this item only.
    pub async fn process_item(&self, item: &BatchItem) -> DownloadResult {
        let Some(reference) = item.resolve() else {
            self.note(LogLevel::Warning, &format!("Could not extract model ID from: {}", item));
            return DownloadResult::invalid(item, "Could not extract model ID");
        };

        let run = self.process(
            &reference.model_id,
            reference.version_id.as_deref(),
            reference.original_url.as_deref(),
        );

        match AssertUnwindSafe(run).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => {
                let msg = format!("Unexpected error: {}", panic_message(panic.as_ref()));
                self.note(
                    LogLevel::Error,
                    &format!("{} while processing model {}", msg, reference.model_id),
                );
                DownloadResult::failed(msg, &reference.model_id, reference.version_id.as_deref())
            }
        }
    }

    /// Process items in order. The cancellation flag is checked before each
    /// item; items not started are left out of the results.
    pub async fn process_many(&self, items: &[BatchItem]) -> Vec<DownloadResult> {
        let mut results = Vec::with_capacity(items.len());

        for (i, item) in items.iter().enumerate() {
            if self.is_cancelled() {
                self.note(
                    LogLevel::Warning,
                    &format!("Cancelled, skipping {} remaining item(s)", items.len() - i),
                );
                break;
            }
            self.observer
                .on_status(&format!("Processing {}/{}: {}", i + 1, items.len(), item));
            results.push(self.process_item(item).await);
        }

        results
    }
}

fn file_name(path: &std::path::Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_prefers_model_id() {
        let r = DownloadResult::failed("boom", "12", None);
        assert_eq!(r.label(), "12");
        let r = DownloadResult::invalid(&BatchItem::from("garbage"), "bad");
        assert_eq!(r.label(), "garbage");
        assert_eq!(DownloadResult::default().label(), "Unknown");
    }

    #[test]
    fn panic_payloads_become_text() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("static str");
        assert_eq!(panic_message(boxed.as_ref()), "static str");
        let boxed: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(boxed.as_ref()), "owned");
        let boxed: Box<dyn std::any::Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }
}
