//! Console front-end: batch mode for URL arguments, a small menu otherwise.

pub mod progress;
pub mod report;

use crate::catalog::CatalogError;
use crate::config::{ConfigError, Settings};
use crate::library;
use crate::pipeline::{BatchItem, BatchSummary, ModelReference, Pipeline};
use progress::ConsoleObserver;
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Ctrl-C handling. The first interrupt during a batch requests
/// cancellation; any other interrupt exits.
struct Interrupt {
    cancel: Arc<AtomicBool>,
    batch_active: Arc<AtomicBool>,
}

impl Interrupt {
    fn install(cancel: Arc<AtomicBool>) -> Self {
        let batch_active = Arc::new(AtomicBool::new(false));
        let (flag, active) = (Arc::clone(&cancel), Arc::clone(&batch_active));

        let spawned = std::thread::Builder::new()
            .name("ctrl-c".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(e) => {
                        log::warn!("[CLI] Ctrl-C handler unavailable: {}", e);
                        return;
                    }
                };
                runtime.block_on(async move {
                    while tokio::signal::ctrl_c().await.is_ok() {
                        if active.load(Ordering::SeqCst) && !flag.swap(true, Ordering::SeqCst) {
                            eprintln!("\nInterrupted: finishing the current model, then stopping...");
                        } else {
                            eprintln!("\nExiting...");
                            std::process::exit(130);
                        }
                    }
                });
            });
        if let Err(e) = spawned {
            log::warn!("[CLI] Ctrl-C handler unavailable: {}", e);
        }

        Self {
            cancel,
            batch_active,
        }
    }

    fn begin_batch(&self) {
        self.cancel.store(false, Ordering::SeqCst);
        self.batch_active.store(true, Ordering::SeqCst);
    }

    fn end_batch(&self) -> bool {
        self.batch_active.store(false, Ordering::SeqCst);
        self.cancel.load(Ordering::SeqCst)
    }
}

struct App {
    runtime: tokio::runtime::Runtime,
    pipeline: Pipeline,
    observer: Arc<ConsoleObserver>,
    interrupt: Interrupt,
}

impl App {
    fn new(settings: Settings) -> Result<Self, CliError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let observer = Arc::new(ConsoleObserver::new());
        let pipeline = Pipeline::from_settings(settings)?.with_observer(observer.clone());
        let interrupt = Interrupt::install(pipeline.cancel_flag());

        Ok(Self {
            runtime,
            pipeline,
            observer,
            interrupt,
        })
    }

    fn run_batch(&self, items: &[BatchItem]) -> Vec<crate::pipeline::DownloadResult> {
        log::info!("[CLI] Processing {} model(s)...", items.len());
        self.interrupt.begin_batch();
        let results = self.runtime.block_on(self.pipeline.process_many(items));
        self.observer.clear();
        if self.interrupt.end_batch() {
            log::warn!("[CLI] Download interrupted by user");
        }
        results
    }
}

/// Entry point used by the binary.
pub fn run(urls: Vec<String>) -> Result<(), CliError> {
    let settings = Settings::from_env()?;
    log::info!("[CLI] Starting CivitAI Model Downloader");
    log::info!("[CLI] Library root: {}", settings.base_dir.display());

    let app = App::new(settings)?;
    let result = if urls.is_empty() {
        interactive(&app)
    } else {
        batch(&app, urls)
    };
    log::info!("[CLI] Download session completed");
    result
}

/// Log each URL as queued or rejected. Rejected URLs stay in the batch and
/// come back as failed results.
fn validate(urls: Vec<String>) -> (Vec<BatchItem>, usize) {
    let mut valid = 0;
    let items = urls
        .into_iter()
        .map(|url| {
            match ModelReference::parse(&url) {
                Some(r) => {
                    valid += 1;
                    match &r.version_id {
                        Some(v) => log::info!("[CLI] Added to queue: Model {} (Version {})", r.model_id, v),
                        None => log::info!("[CLI] Added to queue: Model {}", r.model_id),
                    }
                }
                None => log::warn!("[CLI] Invalid URL format: {}", url),
            }
            BatchItem::Url(url)
        })
        .collect();
    (items, valid)
}

fn batch(app: &App, urls: Vec<String>) -> Result<(), CliError> {
    let (items, valid) = validate(urls);
    if valid == 0 {
        log::error!("[CLI] No valid URLs found. Exiting.");
        return Ok(());
    }

    let results = app.run_batch(&items);
    let mut out = io::stdout().lock();
    report::write_summary(&mut out, &BatchSummary::from_results(&results))?;
    report::write_details(&mut out, &results)?;
    Ok(())
}

fn prompt(out: &mut impl Write, input: &mut impl BufRead, text: &str) -> io::Result<Option<String>> {
    write!(out, "{}", text)?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn interactive(app: &App) -> Result<(), CliError> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();

    writeln!(out, "\n==================================================")?;
    writeln!(out, "CivitAI Model Downloader - Interactive Mode")?;
    writeln!(out, "==================================================")?;

    loop {
        writeln!(out, "\nOptions:\n1. Download model(s)\n2. View existing downloads\n3. Exit")?;
        let Some(choice) = prompt(&mut out, &mut input, "\nEnter your choice (1-3): ")? else {
            break;
        };

        match choice.as_str() {
            "1" => {
                writeln!(out, "\nEnter CivitAI URLs (one per line, empty line to finish):")?;
                let mut urls = Vec::new();
                while let Some(url) = prompt(&mut out, &mut input, "URL: ")? {
                    if url.is_empty() {
                        break;
                    }
                    urls.push(url);
                }
                if urls.is_empty() {
                    writeln!(out, "No URLs entered.")?;
                    continue;
                }
                let items: Vec<BatchItem> = urls.into_iter().map(BatchItem::Url).collect();
                let results = app.run_batch(&items);
                report::write_summary(&mut out, &BatchSummary::from_results(&results))?;
            }
            "2" => show_library(app, &mut out)?,
            "3" => break,
            _ => writeln!(out, "Invalid choice. Please enter 1, 2, or 3.")?,
        }
    }
    Ok(())
}

fn show_library(app: &App, out: &mut impl Write) -> Result<(), CliError> {
    let base_dir = &app.pipeline.settings().base_dir;
    let paths = match library::find_existing_downloads(base_dir) {
        Ok(paths) => paths,
        Err(e) => {
            log::error!("[CLI] {}", e);
            Vec::new()
        }
    };

    let summaries: Vec<_> = paths
        .iter()
        .take(report::LIBRARY_PREVIEW)
        .filter_map(|p| library::DownloadSummary::load(p).ok())
        .collect();
    report::write_library(out, &summaries, paths.len())?;
    Ok(())
}
