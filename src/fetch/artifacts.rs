//! Artifact selection: which weight file and which previews to pull for a
//! version, and what to call them on disk.

use super::transfer::{ProgressFn, Transfer};
use crate::catalog::{FileDescriptor, VersionRecord};
use crate::routing::sanitize_filename;
use std::path::{Path, PathBuf};

/// Canonical weight-file extension, preferred when a version ships several.
pub const WEIGHT_EXTENSION: &str = ".safetensors";

const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpeg", ".jpg", ".webp"];
const DEFAULT_IMAGE_EXTENSION: &str = ".jpg";

/// First `Model` file ending in `.safetensors`, else the first `Model` file.
pub fn select_model_file(files: &[FileDescriptor]) -> Option<&FileDescriptor> {
    let models = || files.iter().filter(|f| f.file_type == "Model");
    models()
        .find(|f| f.name.to_lowercase().ends_with(WEIGHT_EXTENSION))
        .or_else(|| models().next())
}

/// On-disk name for a catalog file: its last path component, sanitized.
///
/// `None` when nothing usable is left, so the file can never land outside
/// the model folder.
pub fn local_file_name(name: &str) -> Option<String> {
    let last = Path::new(name).file_name()?.to_string_lossy();
    let clean = sanitize_filename(&last);
    match clean.as_str() {
        "" | "." | ".." => None,
        _ => Some(clean),
    }
}

/// Extension for a preview image, taken from the URL path when recognised.
pub fn image_extension(url: &str) -> &'static str {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_lowercase();
    IMAGE_EXTENSIONS
        .iter()
        .find(|ext| path.ends_with(*ext))
        .copied()
        .unwrap_or(DEFAULT_IMAGE_EXTENSION)
}

/// `preview_01.png`, `preview_02.jpg`, ... (1-based).
pub fn image_file_name(index: usize, url: &str) -> String {
    format!("preview_{:02}{}", index, image_extension(url))
}

/// Download the version's primary weight file into `target_dir`.
///
/// Returns the saved file name, or `None` when nothing suitable exists or
/// the transfer failed.
pub async fn fetch_model_file(
    transfer: &dyn Transfer,
    version: &VersionRecord,
    target_dir: &Path,
    on_progress: &ProgressFn<'_>,
) -> Option<String> {
    let Some(file) = select_model_file(&version.files) else {
        log::warn!("[FETCH] No model file found for version {}", version.id);
        return None;
    };
    let Some(url) = file.download_url.as_deref().filter(|u| !u.is_empty()) else {
        log::warn!("[FETCH] Model file '{}' has no download URL", file.name);
        return None;
    };

    let Some(local_name) = local_file_name(&file.name) else {
        log::warn!("[FETCH] Model file name '{}' is not usable on disk", file.name);
        return None;
    };

    let dest = target_dir.join(&local_name);
    match transfer.download(url, &dest, on_progress).await {
        Ok(bytes) => {
            log::info!("[FETCH] Saved {} ({} bytes)", local_name, bytes);
            Some(local_name)
        }
        Err(e) => {
            log::error!("[FETCH] Failed to download model file {}: {}", file.name, e);
            None
        }
    }
}

/// Download up to `max_images` previews, in catalog order.
///
/// Entries without a URL are skipped; a failed image is logged and the
/// rest still run. Returns the paths actually saved.
pub async fn fetch_images(
    transfer: &dyn Transfer,
    version: &VersionRecord,
    target_dir: &Path,
    max_images: usize,
    on_progress: &ProgressFn<'_>,
) -> Vec<PathBuf> {
    let mut saved = Vec::new();

    for (i, image) in version.images.iter().take(max_images).enumerate() {
        let Some(url) = image.url.as_deref().filter(|u| !u.is_empty()) else {
            log::warn!("[FETCH] Image {} has no URL, skipping", i + 1);
            continue;
        };

        let dest = target_dir.join(image_file_name(i + 1, url));
        match transfer.download(url, &dest, on_progress).await {
            Ok(_) => saved.push(dest),
            Err(e) => log::error!("[FETCH] Failed to download image {}: {}", i + 1, e),
        }
    }

    log::info!("[FETCH] Saved {} preview image(s)", saved.len());
    saved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(file_type: &str, name: &str) -> FileDescriptor {
        FileDescriptor {
            file_type: file_type.to_string(),
            name: name.to_string(),
            download_url: Some(format!("https://example.test/{}", name)),
        }
    }

    #[test]
    fn prefers_safetensors_model_file() {
        let files = vec![
            file("Training Data", "data.zip"),
            file("Model", "foo.ckpt"),
            file("Model", "foo.safetensors"),
        ];
        assert_eq!(select_model_file(&files).unwrap().name, "foo.safetensors");
    }

    #[test]
    fn falls_back_to_first_model_file() {
        let files = vec![file("Config", "foo.yaml"), file("Model", "foo.ckpt"), file("Model", "bar.pt")];
        assert_eq!(select_model_file(&files).unwrap().name, "foo.ckpt");
    }

    #[test]
    fn no_model_typed_file_selects_nothing() {
        let files = vec![file("Training Data", "x.safetensors")];
        assert!(select_model_file(&files).is_none());
        assert!(select_model_file(&[]).is_none());
    }

    #[test]
    fn local_file_name_keeps_only_the_last_component() {
        assert_eq!(local_file_name("foo.safetensors").as_deref(), Some("foo.safetensors"));
        assert_eq!(
            local_file_name("../../../escaped.safetensors").as_deref(),
            Some("escaped.safetensors")
        );
        assert_eq!(local_file_name("/etc/cron.d/job").as_deref(), Some("job"));
        assert_eq!(local_file_name("my model v2.ckpt").as_deref(), Some("my_model_v2.ckpt"));
    }

    #[test]
    fn unusable_file_names_are_rejected() {
        assert!(local_file_name("").is_none());
        assert!(local_file_name("..").is_none());
        assert!(local_file_name("models/..").is_none());
        assert!(local_file_name("..\\").is_none());
        assert!(local_file_name("???").is_none());
    }

    #[test]
    fn image_extension_from_url() {
        assert_eq!(image_extension("https://cdn.test/a/b.PNG"), ".png");
        assert_eq!(image_extension("https://cdn.test/a/b.webp?width=450"), ".webp");
        assert_eq!(image_extension("https://cdn.test/a/b.jpeg#frag"), ".jpeg");
    }

    #[test]
    fn unrecognised_extension_defaults_to_jpg() {
        assert_eq!(image_extension("https://cdn.test/a/b.gif"), ".jpg");
        assert_eq!(image_extension("https://cdn.test/a/width=450/12345"), ".jpg");
    }

    #[test]
    fn image_names_are_one_based_and_padded() {
        assert_eq!(image_file_name(1, "https://x/a.png"), "preview_01.png");
        assert_eq!(image_file_name(12, "https://x/a"), "preview_12.jpg");
    }
}
