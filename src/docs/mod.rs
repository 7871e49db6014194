//! Per-model documentation: the HTML info page and the JSON sidecar.

pub mod html;
pub mod metadata;

pub use html::render;
pub use metadata::{
    load_metadata, save_html_info, save_metadata, DocsError, DownloadInfo, DownloadedFiles,
    MetadataSidecar, METADATA_SUFFIX,
};
