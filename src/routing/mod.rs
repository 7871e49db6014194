//! Routing domain: where in the library a model's folder lives.
//!
//! Lookup order: exact (type, key) → (type, unknown) → `Other/Unknown`.

mod paths;
mod table;

pub use paths::{ensure_target_dir, model_folder_name, sanitize_filename};
pub use table::{find_route, routes, RouteEntry};

use crate::classify::BaseModelKey;
use std::path::{Path, PathBuf};

/// Last-resort folder for model types the table does not know.
pub const DEFAULT_ROUTE: &str = "Other/Unknown";

/// Relative library path for a model type and base-model key.
pub fn route(model_type: &str, base: BaseModelKey) -> &'static str {
    let model_type = model_type.trim().to_lowercase();

    if let Some(entry) = find_route(&model_type, base) {
        return entry.path;
    }

    let fallback = find_route(&model_type, BaseModelKey::Unknown)
        .map(|e| e.path)
        .unwrap_or(DEFAULT_ROUTE);

    log::warn!(
        "[ROUTE] No directory mapping for ({}, {}), using fallback {}",
        model_type,
        base,
        fallback
    );
    fallback
}

/// Route, then create `{base_dir}/{route}/{folder}` on disk.
pub fn resolve_target_dir(
    base_dir: &Path,
    model_type: &str,
    base: BaseModelKey,
    folder: &str,
) -> std::io::Result<PathBuf> {
    ensure_target_dir(base_dir, route(model_type, base), folder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_entry_routes_to_itself() {
        for e in routes() {
            assert_eq!(route(e.model_type, e.base), e.path);
        }
    }

    #[test]
    fn model_type_is_case_insensitive() {
        assert_eq!(route("LoRA", BaseModelKey::Sdxl), "SDXL/Base/Lora");
        assert_eq!(route("Checkpoint Merge", BaseModelKey::Pony), "SDXL/Pony/Checkpoint");
    }

    #[test]
    fn missing_pair_falls_back_to_type_unknown() {
        // No hypernetwork folder exists for FLUX.
        assert_eq!(route("Hypernetwork", BaseModelKey::FluxDev), "Other/Hypernetworks");
        assert_eq!(route("LoRA", BaseModelKey::Unknown), "Other/Lora");
    }

    #[test]
    fn unknown_type_falls_back_to_default() {
        assert_eq!(route("MotionModule", BaseModelKey::Sdxl), DEFAULT_ROUTE);
        assert_eq!(route("", BaseModelKey::Unknown), DEFAULT_ROUTE);
    }

    #[test]
    fn resolve_creates_directory_and_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let a = resolve_target_dir(tmp.path(), "LoRA", BaseModelKey::Sdxl, "Foo_Bar_1_9").unwrap();
        let b = resolve_target_dir(tmp.path(), "LoRA", BaseModelKey::Sdxl, "Foo_Bar_1_9").unwrap();
        assert_eq!(a, b);
        assert!(a.is_dir());
        assert!(a.ends_with("SDXL/Base/Lora/Foo_Bar_1_9"));
    }
}
