//! Background batch worker for interactive front-ends.
//!
//! A whole batch runs on one dedicated thread with its own current-thread
//! runtime, so models are still processed strictly one at a time. Progress
//! flows out through the observer; counters are atomics written only by
//! the worker. `stop` is cooperative: the flag is seen between models and
//! between download phases, never mid-transfer.

use super::observer::{LogLevel, PipelineObserver};
use super::processor::Pipeline;
use super::reference::BatchItem;
use crate::catalog::{CatalogApi, CatalogError, CivitaiClient};
use crate::config::Settings;
use crate::fetch::{DownloadProgress, HttpTransfer, Transfer};
use chrono::{DateTime, Local, TimeZone};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// How long `stop` waits for the worker before giving up on it.
pub const STOP_TIMEOUT: Duration = Duration::from_secs(5);

type Backends = (Arc<dyn CatalogApi>, Arc<dyn Transfer>);
type BackendFactory = dyn Fn(&Settings) -> Result<Backends, CatalogError> + Send + Sync;

/// Snapshot of the running (or last) batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub started_at: Option<DateTime<Local>>,
}

#[derive(Default)]
struct SharedStats {
    total: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
    /// Unix millis, 0 before the first batch.
    started_at_ms: AtomicI64,
}

impl SharedStats {
    fn reset(&self, total: usize) {
        self.total.store(total, Ordering::SeqCst);
        self.completed.store(0, Ordering::SeqCst);
        self.failed.store(0, Ordering::SeqCst);
        self.started_at_ms
            .store(Local::now().timestamp_millis(), Ordering::SeqCst);
    }

    fn snapshot(&self) -> BatchStats {
        let ms = self.started_at_ms.load(Ordering::SeqCst);
        BatchStats {
            total: self.total.load(Ordering::SeqCst),
            completed: self.completed.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
            started_at: if ms == 0 {
                None
            } else {
                Local.timestamp_millis_opt(ms).single()
            },
        }
    }
}

struct Worker {
    handle: JoinHandle<()>,
    done: Receiver<()>,
}

pub struct DownloadManager {
    settings: Settings,
    observer: Arc<dyn PipelineObserver>,
    factory: Arc<BackendFactory>,
    cancel: Arc<AtomicBool>,
    busy: Arc<AtomicBool>,
    stats: Arc<SharedStats>,
    worker: Option<Worker>,
}

impl DownloadManager {
    /// Manager that talks to the live catalog.
    pub fn new(settings: Settings, observer: Arc<dyn PipelineObserver>) -> Self {
        let factory: Arc<BackendFactory> = Arc::new(|settings: &Settings| -> Result<Backends, CatalogError> {
            let catalog: Arc<dyn CatalogApi> = Arc::new(CivitaiClient::new(settings)?);
            let transfer: Arc<dyn Transfer> = Arc::new(HttpTransfer::new(settings)?);
            Ok((catalog, transfer))
        });
        Self::with_factory(settings, observer, factory)
    }

    /// Manager over caller-supplied backends.
    pub fn with_backends(
        settings: Settings,
        observer: Arc<dyn PipelineObserver>,
        catalog: Arc<dyn CatalogApi>,
        transfer: Arc<dyn Transfer>,
    ) -> Self {
        let factory: Arc<BackendFactory> = Arc::new(move |_: &Settings| -> Result<Backends, CatalogError> {
            Ok((Arc::clone(&catalog), Arc::clone(&transfer)))
        });
        Self::with_factory(settings, observer, factory)
    }

    fn with_factory(
        settings: Settings,
        observer: Arc<dyn PipelineObserver>,
        factory: Arc<BackendFactory>,
    ) -> Self {
        Self {
            settings,
            observer,
            factory,
            cancel: Arc::new(AtomicBool::new(false)),
            busy: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(SharedStats::default()),
            worker: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Applies to the next batch; a running one keeps its settings.
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> BatchStats {
        self.stats.snapshot()
    }

    /// Start a batch in the background. Returns `false` if one is already
    /// running or there is nothing to do.
    pub fn start(&mut self, urls: Vec<String>) -> bool {
        if self.is_busy() {
            self.log(LogLevel::Warning, "Download already in progress");
            return false;
        }

        let items: Vec<BatchItem> = urls
            .into_iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .map(BatchItem::Url)
            .collect();
        if items.is_empty() {
            self.log(LogLevel::Warning, "No URLs provided");
            return false;
        }

        // Reap a worker that already finished.
        if let Some(old) = self.worker.take() {
            let _ = old.handle.join();
        }

        self.cancel.store(false, Ordering::SeqCst);
        self.stats.reset(items.len());
        self.busy.store(true, Ordering::SeqCst);
        self.log(
            LogLevel::Info,
            &format!("Starting download of {} model(s)", items.len()),
        );

        let job = BatchJob {
            items,
            settings: self.settings.clone(),
            observer: Arc::clone(&self.observer),
            factory: Arc::clone(&self.factory),
            cancel: Arc::clone(&self.cancel),
            stats: Arc::clone(&self.stats),
        };
        let busy = Arc::clone(&self.busy);
        let (done_tx, done_rx) = mpsc::channel();

        let spawned = std::thread::Builder::new()
            .name("download-worker".to_string())
            .spawn(move || {
                job.run();
                busy.store(false, Ordering::SeqCst);
                let _ = done_tx.send(());
            });

        match spawned {
            Ok(handle) => {
                self.worker = Some(Worker {
                    handle,
                    done: done_rx,
                });
                true
            }
            Err(e) => {
                self.busy.store(false, Ordering::SeqCst);
                self.log(LogLevel::Error, &format!("Failed to start download worker: {}", e));
                false
            }
        }
    }

    /// Request cancellation and wait up to [`STOP_TIMEOUT`] for the worker.
    pub fn stop(&mut self) {
        if !self.is_busy() && self.worker.is_none() {
            return;
        }
        self.log(LogLevel::Warning, "Stopping download...");
        self.cancel.store(true, Ordering::SeqCst);

        if let Some(worker) = self.worker.take() {
            match worker.done.recv_timeout(STOP_TIMEOUT) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    let _ = worker.handle.join();
                }
                Err(RecvTimeoutError::Timeout) => {
                    log::warn!(
                        "[MANAGER] Worker still busy after {:?}; continuing without it",
                        STOP_TIMEOUT
                    );
                }
            }
        }

        self.observer.on_status("Download stopped");
        self.log(LogLevel::Warning, "Download stopped by user");
    }

    /// Block until the current batch finishes.
    pub fn wait(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.handle.join();
        }
    }

    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Info => log::info!("[MANAGER] {}", message),
            LogLevel::Warning => log::warn!("[MANAGER] {}", message),
            LogLevel::Error => log::error!("[MANAGER] {}", message),
        }
        self.observer.on_log(level, message);
    }
}

impl Drop for DownloadManager {
    fn drop(&mut self) {
        if self.is_busy() {
            self.cancel.store(true, Ordering::SeqCst);
        }
    }
}

/// Everything the worker thread owns.
struct BatchJob {
    items: Vec<BatchItem>,
    settings: Settings,
    observer: Arc<dyn PipelineObserver>,
    factory: Arc<BackendFactory>,
    cancel: Arc<AtomicBool>,
    stats: Arc<SharedStats>,
}

impl BatchJob {
    fn run(self) {
        let total = self.items.len();

        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                self.abort(&format!("Failed to start async runtime: {}", e));
                return;
            }
        };

        let (catalog, transfer) = match (self.factory)(&self.settings) {
            Ok(backends) => backends,
            Err(e) => {
                self.abort(&format!("Failed to create catalog client: {}", e));
                return;
            }
        };

        let position = Arc::new(AtomicUsize::new(0));
        let overall: Arc<dyn PipelineObserver> = Arc::new(OverallProgress {
            inner: Arc::clone(&self.observer),
            position: Arc::clone(&position),
            total,
        });
        let pipeline = Pipeline::new(catalog, transfer, self.settings.clone())
            .with_observer(overall)
            .with_cancel_flag(Arc::clone(&self.cancel));

        for (i, item) in self.items.iter().enumerate() {
            if self.cancel.load(Ordering::SeqCst) {
                log::warn!("[MANAGER] Download stopped by user");
                break;
            }
            position.store(i, Ordering::SeqCst);
            self.observer
                .on_status(&format!("Processing {}/{}: {}", i + 1, total, item));

            let result = runtime.block_on(pipeline.process_item(item));
            if result.success {
                self.stats.completed.fetch_add(1, Ordering::SeqCst);
                let done = self.stats.completed.load(Ordering::SeqCst);
                self.observer.on_progress(
                    (i + 1) as f32 / total as f32 * 100.0,
                    &format!("Completed {}/{}", done, total),
                );
            } else {
                self.stats.failed.fetch_add(1, Ordering::SeqCst);
                let message = format!(
                    "Failed {}: {}",
                    result.label(),
                    result.error.as_deref().unwrap_or("Unknown error")
                );
                log::error!("[MANAGER] {}", message);
                self.observer.on_log(LogLevel::Error, &message);
            }
        }

        self.finish();
    }

    fn abort(&self, message: &str) {
        log::error!("[MANAGER] {}", message);
        self.observer.on_log(LogLevel::Error, message);
        self.stats.failed.store(self.items.len(), Ordering::SeqCst);
        self.finish();
    }

    fn finish(&self) {
        let stats = self.stats.snapshot();
        if self.cancel.load(Ordering::SeqCst) {
            self.observer.on_status("Download stopped");
        } else {
            self.observer.on_progress(100.0, "Download complete!");
        }

        let elapsed = stats
            .started_at
            .map(|start| Local::now().signed_duration_since(start))
            .unwrap_or_else(chrono::Duration::zero);
        let message = format!(
            "Download session complete. Total: {}, Completed: {}, Failed: {}, Duration: {}",
            stats.total,
            stats.completed,
            stats.failed,
            format_duration(elapsed)
        );
        log::info!("[MANAGER] {}", message);
        self.observer.on_log(LogLevel::Info, &message);
        self.observer.on_status(&format!(
            "Completed: {}/{} models",
            stats.completed, stats.total
        ));
    }
}

/// Maps per-model phase progress onto the whole batch.
struct OverallProgress {
    inner: Arc<dyn PipelineObserver>,
    position: Arc<AtomicUsize>,
    total: usize,
}

impl PipelineObserver for OverallProgress {
    fn on_progress(&self, percent: f32, status: &str) {
        let slot = 100.0 / self.total.max(1) as f32;
        let start = self.position.load(Ordering::SeqCst) as f32 * slot;
        self.inner.on_progress(start + percent / 100.0 * slot, status);
    }

    fn on_status(&self, status: &str) {
        self.inner.on_status(status);
    }

    fn on_log(&self, level: LogLevel, message: &str) {
        self.inner.on_log(level, message);
    }

    fn on_transfer(&self, progress: DownloadProgress) {
        self.inner.on_transfer(progress);
    }
}

/// `H:MM:SS`, whole seconds.
pub fn format_duration(elapsed: chrono::Duration) -> String {
    let secs = elapsed.num_seconds().max(0);
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::observer::NoopObserver;

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(chrono::Duration::seconds(0)), "0:00:00");
        assert_eq!(format_duration(chrono::Duration::seconds(3723)), "1:02:03");
        assert_eq!(format_duration(chrono::Duration::seconds(-5)), "0:00:00");
    }

    #[test]
    fn stats_start_empty() {
        let manager = DownloadManager::new(Settings::default(), Arc::new(NoopObserver));
        assert!(!manager.is_busy());
        assert_eq!(manager.stats(), BatchStats::default());
    }

    #[test]
    fn refuses_empty_batch() {
        let mut manager = DownloadManager::new(Settings::default(), Arc::new(NoopObserver));
        assert!(!manager.start(vec![]));
        assert!(!manager.start(vec!["   ".to_string()]));
        assert!(!manager.is_busy());
    }

    #[test]
    fn overall_progress_maps_into_item_slot() {
        struct Capture(std::sync::Mutex<Vec<f32>>);
        impl PipelineObserver for Capture {
            fn on_progress(&self, percent: f32, _status: &str) {
                self.0.lock().unwrap().push(percent);
            }
        }

        let capture = Arc::new(Capture(std::sync::Mutex::new(Vec::new())));
        let overall = OverallProgress {
            inner: capture.clone(),
            position: Arc::new(AtomicUsize::new(1)),
            total: 4,
        };
        overall.on_progress(0.0, "");
        overall.on_progress(100.0, "");
        assert_eq!(*capture.0.lock().unwrap(), vec![25.0, 50.0]);
    }
}
