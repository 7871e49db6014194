//! Library domain: browse what is already on disk.
//!
//! The library never re-derives classification; it only reads back the
//! metadata sidecars the pipeline wrote.

use crate::docs::{self, MetadataSidecar, METADATA_SUFFIX};
use serde_json::Value;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const UNKNOWN: &str = "Unknown";

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("Failed to scan {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error(transparent)]
    Metadata(#[from] docs::DocsError),
}

/// One downloaded model, as the library shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSummary {
    pub model_name: String,
    pub model_type: String,
    pub version_name: String,
    pub base_model: String,
    pub downloaded_at: String,
    pub original_url: Option<String>,
    /// Folder holding the model and its sidecar.
    pub location: PathBuf,
    /// First saved preview image, if any.
    pub preview_image: Option<PathBuf>,
}

fn text_field(record: &Value, key: &str) -> String {
    record
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(UNKNOWN)
        .to_string()
}

impl DownloadSummary {
    pub fn from_sidecar(sidecar: &MetadataSidecar, metadata_path: &Path) -> Self {
        let location = metadata_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let info = &sidecar.download_info;
        let downloaded_at = if info.downloaded_at.is_empty() {
            UNKNOWN.to_string()
        } else {
            info.downloaded_at.clone()
        };
        let preview_image = info
            .downloaded_files
            .images
            .as_ref()
            .and_then(|images| images.first())
            .map(|name| location.join(name));

        Self {
            model_name: text_field(&sidecar.model, "name"),
            model_type: text_field(&sidecar.model, "type"),
            version_name: text_field(&sidecar.version, "name"),
            base_model: text_field(&sidecar.version, "baseModel"),
            downloaded_at,
            original_url: info.original_url.clone(),
            location,
            preview_image,
        }
    }

    /// Read a sidecar from disk and summarise it.
    pub fn load(metadata_path: &Path) -> Result<Self, LibraryError> {
        let sidecar = docs::load_metadata(metadata_path)?;
        Ok(Self::from_sidecar(&sidecar, metadata_path))
    }

    fn has_unknown(&self) -> bool {
        self.model_type.eq_ignore_ascii_case(UNKNOWN) || self.base_model.eq_ignore_ascii_case(UNKNOWN)
    }
}

/// Every `*_metadata.json` below `base_dir`, in path order.
///
/// A missing base directory is an empty library, not an error. Only an
/// unreadable base directory fails the scan; unreadable entries below it
/// are logged and skipped.
pub fn find_existing_downloads(base_dir: &Path) -> Result<Vec<PathBuf>, LibraryError> {
    if !base_dir.exists() {
        log::info!("[LIBRARY] {} does not exist yet", base_dir.display());
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(base_dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) if source.depth() == 0 => {
                return Err(LibraryError::Scan {
                    path: base_dir.to_path_buf(),
                    source,
                });
            }
            Err(e) => {
                log::warn!("[LIBRARY] Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if entry.file_type().is_file()
            && entry.file_name().to_string_lossy().ends_with(METADATA_SUFFIX)
        {
            found.push(entry.into_path());
        }
    }

    log::info!("[LIBRARY] Found {} existing downloads", found.len());
    Ok(found)
}

/// Summaries for everything under `base_dir`. Unreadable sidecars are
/// logged and skipped.
pub fn load_library(base_dir: &Path) -> Result<Vec<DownloadSummary>, LibraryError> {
    let summaries = find_existing_downloads(base_dir)?
        .iter()
        .filter_map(|path| match DownloadSummary::load(path) {
            Ok(summary) => Some(summary),
            Err(e) => {
                log::error!("[LIBRARY] Skipping {}: {}", path.display(), e);
                None
            }
        })
        .collect();
    Ok(summaries)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    DateNewest,
    DateOldest,
    NameAsc,
    NameDesc,
    Type,
    BaseModel,
}

impl SortOrder {
    fn compare(&self, a: &DownloadSummary, b: &DownloadSummary) -> Ordering {
        let lower = |s: &str| s.to_lowercase();
        match self {
            Self::DateNewest => b.downloaded_at.cmp(&a.downloaded_at),
            Self::DateOldest => a.downloaded_at.cmp(&b.downloaded_at),
            Self::NameAsc => lower(&a.model_name).cmp(&lower(&b.model_name)),
            Self::NameDesc => lower(&b.model_name).cmp(&lower(&a.model_name)),
            Self::Type => lower(&a.model_type).cmp(&lower(&b.model_type)),
            Self::BaseModel => lower(&a.base_model).cmp(&lower(&b.base_model)),
        }
    }
}

/// Library view filter. `None` fields match everything.
#[derive(Debug, Clone, Default)]
pub struct LibraryFilter {
    /// Case-insensitive substring of name, type or base model.
    pub search: Option<String>,
    /// Exact model type, case-insensitive.
    pub model_type: Option<String>,
    /// Case-insensitive substring of the base model.
    pub base_model: Option<String>,
    pub hide_unknown: bool,
}

impl LibraryFilter {
    pub fn matches(&self, summary: &DownloadSummary) -> bool {
        if self.hide_unknown && summary.has_unknown() {
            return false;
        }

        if let Some(search) = non_blank(&self.search) {
            let needle = search.to_lowercase();
            let hit = [&summary.model_name, &summary.model_type, &summary.base_model]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        if let Some(wanted) = non_blank(&self.model_type) {
            if !summary.model_type.eq_ignore_ascii_case(wanted) {
                return false;
            }
        }

        if let Some(base) = non_blank(&self.base_model) {
            if !summary.base_model.to_lowercase().contains(&base.to_lowercase()) {
                return false;
            }
        }

        true
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Filter then sort (stable).
pub fn query(
    summaries: &[DownloadSummary],
    filter: &LibraryFilter,
    order: SortOrder,
) -> Vec<DownloadSummary> {
    let mut out: Vec<DownloadSummary> = summaries
        .iter()
        .filter(|s| filter.matches(s))
        .cloned()
        .collect();
    out.sort_by(|a, b| order.compare(a, b));
    log::info!("[LIBRARY] Filtered to {} of {} models", out.len(), summaries.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str, model_type: &str, base: &str, at: &str) -> DownloadSummary {
        DownloadSummary {
            model_name: name.into(),
            model_type: model_type.into(),
            version_name: "v1".into(),
            base_model: base.into(),
            downloaded_at: at.into(),
            original_url: None,
            location: PathBuf::from("/lib").join(name),
            preview_image: None,
        }
    }

    fn sample() -> Vec<DownloadSummary> {
        vec![
            summary("beta", "LORA", "SDXL 1.0", "2024-02-01T00:00:00+00:00"),
            summary("Alpha", "Checkpoint", "SD 1.5", "2024-03-01T00:00:00+00:00"),
            summary("gamma", "Unknown", "Pony", "2024-01-01T00:00:00+00:00"),
            summary("delta", "LORA", "Unknown", "2024-04-01T00:00:00+00:00"),
        ]
    }

    fn names(list: &[DownloadSummary]) -> Vec<&str> {
        list.iter().map(|s| s.model_name.as_str()).collect()
    }

    #[test]
    fn default_query_sorts_newest_first() {
        let out = query(&sample(), &LibraryFilter::default(), SortOrder::default());
        assert_eq!(names(&out), vec!["delta", "Alpha", "beta", "gamma"]);
    }

    #[test]
    fn name_sort_ignores_case() {
        let out = query(&sample(), &LibraryFilter::default(), SortOrder::NameAsc);
        assert_eq!(names(&out), vec!["Alpha", "beta", "delta", "gamma"]);
        let out = query(&sample(), &LibraryFilter::default(), SortOrder::NameDesc);
        assert_eq!(names(&out), vec!["gamma", "delta", "beta", "Alpha"]);
    }

    #[test]
    fn hide_unknown_drops_either_unknown_field() {
        let filter = LibraryFilter {
            hide_unknown: true,
            ..Default::default()
        };
        let out = query(&sample(), &filter, SortOrder::NameAsc);
        assert_eq!(names(&out), vec!["Alpha", "beta"]);
    }

    #[test]
    fn search_type_and_base_filters() {
        let search = LibraryFilter {
            search: Some("SDXL".into()),
            ..Default::default()
        };
        assert_eq!(names(&query(&sample(), &search, SortOrder::NameAsc)), vec!["beta"]);

        let by_type = LibraryFilter {
            model_type: Some("lora".into()),
            ..Default::default()
        };
        assert_eq!(
            names(&query(&sample(), &by_type, SortOrder::NameAsc)),
            vec!["beta", "delta"]
        );

        let by_base = LibraryFilter {
            base_model: Some("sd".into()),
            ..Default::default()
        };
        assert_eq!(
            names(&query(&sample(), &by_base, SortOrder::NameAsc)),
            vec!["Alpha", "beta"]
        );
    }

    #[test]
    fn blank_filters_match_everything() {
        let filter = LibraryFilter {
            search: Some("  ".into()),
            model_type: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(query(&sample(), &filter, SortOrder::Type).len(), 4);
    }

    #[test]
    fn missing_base_dir_is_empty_library() {
        let tmp = tempfile::tempdir().unwrap();
        let found = find_existing_downloads(&tmp.path().join("nope")).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn scan_finds_only_metadata_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("SD15/Lora/X_1_2");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("X_1_2_metadata.json"), "{}").unwrap();
        std::fs::write(dir.join("X_1_2_info.html"), "<html>").unwrap();
        std::fs::write(dir.join("notes.json"), "{}").unwrap();

        let found = find_existing_downloads(tmp.path()).unwrap();
        assert_eq!(found, vec![dir.join("X_1_2_metadata.json")]);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subdirectory_does_not_hide_the_rest() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let good = tmp.path().join("SD15/Lora/A_1_1");
        let locked = tmp.path().join("SDXL/Base/Lora/B_2_2");
        std::fs::create_dir_all(&good).unwrap();
        std::fs::create_dir_all(&locked).unwrap();
        std::fs::write(good.join("A_1_1_metadata.json"), "{}").unwrap();
        std::fs::write(locked.join("B_2_2_metadata.json"), "{}").unwrap();

        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();
        let readable_anyway = std::fs::read_dir(&locked).is_ok();
        let found = find_existing_downloads(tmp.path());
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

        let found = found.unwrap();
        if readable_anyway {
            // Running with privileges that ignore permissions.
            assert_eq!(found.len(), 2);
        } else {
            assert_eq!(found, vec![good.join("A_1_1_metadata.json")]);
        }
    }

    #[test]
    fn unreadable_sidecars_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("bad_metadata.json"), "not json").unwrap();
        assert!(load_library(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn summary_defaults_missing_fields_to_unknown() {
        let sidecar: MetadataSidecar = serde_json::from_value(serde_json::json!({
            "download_info": {
                "downloaded_files": { "images": ["preview_01.png"] }
            },
            "model": { "name": "Foo" },
            "version": {}
        }))
        .unwrap();
        let s = DownloadSummary::from_sidecar(&sidecar, Path::new("/lib/Foo_1_2/Foo_1_2_metadata.json"));
        assert_eq!(s.model_name, "Foo");
        assert_eq!(s.model_type, "Unknown");
        assert_eq!(s.base_model, "Unknown");
        assert_eq!(s.downloaded_at, "Unknown");
        assert_eq!(s.location, PathBuf::from("/lib/Foo_1_2"));
        assert_eq!(s.preview_image, Some(PathBuf::from("/lib/Foo_1_2/preview_01.png")));
    }
}
