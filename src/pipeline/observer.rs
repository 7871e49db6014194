//! Presentation hooks for the pipeline. Every method defaults to a no-op.

use crate::fetch::DownloadProgress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

pub trait PipelineObserver: Send + Sync {
    /// Phase progress for the current model, 0–100.
    fn on_progress(&self, _percent: f32, _status: &str) {}

    fn on_status(&self, _status: &str) {}

    fn on_log(&self, _level: LogLevel, _message: &str) {}

    /// Raw byte progress of the transfer in flight.
    fn on_transfer(&self, _progress: DownloadProgress) {}
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Fixed points of the per-model progress scale.
pub mod phase {
    pub const FETCHING: f32 = 5.0;
    pub const ROUTING: f32 = 10.0;
    pub const MODEL_FILE: f32 = 15.0;
    pub const IMAGES: f32 = 75.0;
    pub const DOCUMENTING: f32 = 85.0;
    pub const METADATA: f32 = 95.0;
    pub const DONE: f32 = 100.0;
}

/// Map a transfer percentage into the `[start, end]` slice of the scale.
pub fn scale(start: f32, end: f32, percent: u8) -> f32 {
    start + (end - start) * (f32::from(percent.min(100)) / 100.0)
}
