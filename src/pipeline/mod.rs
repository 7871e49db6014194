//! Pipeline domain: one model from catalog lookup to persisted sidecar,
//! and batches of them.

pub mod manager;
pub mod observer;
pub mod processor;
pub mod reference;
pub mod summary;

pub use manager::{BatchStats, DownloadManager};
pub use observer::{LogLevel, NoopObserver, PipelineObserver};
pub use processor::{DownloadResult, Pipeline, FETCH_FAILED};
pub use reference::{parse_model_url, BatchItem, ModelReference};
pub use summary::{BatchSummary, FailedItem};
