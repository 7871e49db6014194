//! Artifact fetching: weight files and preview images.

pub mod artifacts;
pub mod transfer;

pub use artifacts::{
    fetch_images, fetch_model_file, image_file_name, local_file_name, select_model_file,
};
pub use transfer::{DownloadError, DownloadProgress, HttpTransfer, ProgressFn, Transfer};
