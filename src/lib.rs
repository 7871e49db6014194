//! CivitAI downloader: library crate.
//!
//! Wires together:
//! - Catalog records and the REST client (catalog/)
//! - Base-model classification (classify/)
//! - The route table and per-model folders (routing/)
//! - Weight-file and preview downloads (fetch/)
//! - HTML info pages and metadata sidecars (docs/)
//! - The per-model pipeline, batches and the background worker (pipeline/)
//! - Browsing previous downloads (library/)
//! - The console front-end (cli/)

pub mod catalog;
pub mod classify;
pub mod cli;
pub mod config;
pub mod docs;
pub mod fetch;
pub mod library;
pub mod pipeline;
pub mod routing;

pub use config::Settings;
pub use pipeline::{BatchItem, DownloadResult, Pipeline};
