//! Folder naming and on-disk target directory creation.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static ILLEGAL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*\n\r\t]"#).unwrap());

/// Strip characters that are illegal in file names and replace spaces with
/// underscores.
pub fn sanitize_filename(name: &str) -> String {
    ILLEGAL_CHARS
        .replace_all(name, "")
        .trim()
        .replace(' ', "_")
}

/// Per-model folder name: `{sanitized name}_{model id}_{version id}`.
///
/// Stable for a given triple, so re-processing a model reuses its folder.
pub fn model_folder_name(display_name: &str, model_id: &str, version_id: u64) -> String {
    format!("{}_{}_{}", sanitize_filename(display_name), model_id, version_id)
}

/// Create `{base_dir}/{relative}/{folder}` (idempotent) and return it.
pub fn ensure_target_dir(
    base_dir: &Path,
    relative: &str,
    folder: &str,
) -> std::io::Result<PathBuf> {
    let target = base_dir.join(relative).join(folder);
    std::fs::create_dir_all(&target)?;
    log::info!("[ROUTE] Target directory: {}", target.display());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_every_illegal_character() {
        let dirty = "a<b>c:d\"e/f\\g|h?i*j\tk\nl\rm";
        assert_eq!(sanitize_filename(dirty), "abcdefghijklm");
    }

    #[test]
    fn spaces_become_underscores() {
        assert_eq!(sanitize_filename("Foo Bar Baz"), "Foo_Bar_Baz");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed_before_replacing() {
        assert_eq!(sanitize_filename("  Foo Bar  "), "Foo_Bar");
    }

    #[test]
    fn folder_name_is_deterministic() {
        let a = model_folder_name("Foo: Bar?", "123", 9);
        let b = model_folder_name("Foo: Bar?", "123", 9);
        assert_eq!(a, "Foo_Bar_123_9");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_ids_give_distinct_folders() {
        let names = [
            model_folder_name("Foo", "1", 1),
            model_folder_name("Foo", "1", 2),
            model_folder_name("Foo", "2", 1),
            model_folder_name("Bar", "1", 1),
        ];
        for (i, a) in names.iter().enumerate() {
            for b in &names[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn ensure_target_dir_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let first = ensure_target_dir(tmp.path(), "SD15/Lora", "X_1_2").unwrap();
        let second = ensure_target_dir(tmp.path(), "SD15/Lora", "X_1_2").unwrap();
        assert_eq!(first, second);
        assert!(first.is_dir());
        assert!(first.ends_with("SD15/Lora/X_1_2"));
    }
}
