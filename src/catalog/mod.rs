//! Catalog domain: typed records and the API client that fetches them.

pub mod client;
pub mod types;

pub use client::{CatalogApi, CatalogError, CivitaiClient};
pub use types::{FileDescriptor, ImageDescriptor, ModelRecord, ModelType, VersionRecord};
