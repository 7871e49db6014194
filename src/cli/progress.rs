//! Console observer: byte progress bars via indicatif.

use crate::fetch::DownloadProgress;
use crate::pipeline::{LogLevel, PipelineObserver};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})";
const SPINNER_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] {bytes} ({bytes_per_sec})";

/// One bar per transfer; a new transfer replaces the previous bar.
#[derive(Default)]
pub struct ConsoleObserver {
    bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleObserver {
    pub fn new() -> Self {
        Self::default()
    }

    fn new_bar(total: Option<u64>) -> ProgressBar {
        match total {
            Some(len) => {
                let bar = ProgressBar::new(len);
                bar.set_style(
                    ProgressStyle::with_template(BAR_TEMPLATE)
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("#>-"),
                );
                bar
            }
            None => {
                let bar = ProgressBar::new_spinner();
                bar.set_style(
                    ProgressStyle::with_template(SPINNER_TEMPLATE)
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                bar
            }
        }
    }

    /// Drop whatever bar is on screen.
    pub fn clear(&self) {
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(bar) = slot.take() {
                bar.finish_and_clear();
            }
        }
    }
}

impl PipelineObserver for ConsoleObserver {
    fn on_status(&self, status: &str) {
        self.clear();
        log::info!("[PIPELINE] {}", status);
    }

    fn on_log(&self, level: LogLevel, message: &str) {
        if level == LogLevel::Error {
            self.clear();
        }
        log::debug!("[PIPELINE] {} {}", level.as_str(), message);
    }

    fn on_transfer(&self, progress: DownloadProgress) {
        let Ok(mut slot) = self.bar.lock() else {
            return;
        };

        // A smaller count than shown means a new transfer started.
        let restart = slot
            .as_ref()
            .map(|bar| progress.downloaded < bar.position() || bar.length() != progress.total)
            .unwrap_or(true);
        if restart {
            if let Some(old) = slot.take() {
                old.finish_and_clear();
            }
            *slot = Some(Self::new_bar(progress.total));
        }

        if let Some(bar) = slot.as_ref() {
            bar.set_position(progress.downloaded);
            if progress.total == Some(progress.downloaded) {
                bar.finish();
                *slot = None;
            }
        }
    }
}
