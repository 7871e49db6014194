//! End-of-batch console report.

use crate::library::DownloadSummary;
use crate::pipeline::{BatchSummary, DownloadResult};
use std::io::{self, Write};

const RULE: &str = "==================================================";

/// Entries shown by the "view existing downloads" menu option.
pub const LIBRARY_PREVIEW: usize = 10;

pub fn write_summary(out: &mut impl Write, summary: &BatchSummary) -> io::Result<()> {
    writeln!(out, "\n{}\nDOWNLOAD SUMMARY\n{}", RULE, RULE)?;
    writeln!(out, "Total processed: {}", summary.total_processed)?;
    writeln!(out, "Successful: {}", summary.successful)?;
    writeln!(out, "Failed: {}", summary.failed)?;
    writeln!(out, "Success rate: {:.1}%", summary.success_rate)?;

    if !summary.successful_models.is_empty() {
        writeln!(out, "\nSuccessfully downloaded:")?;
        for name in &summary.successful_models {
            writeln!(out, "  ✓ {}", name)?;
        }
    }

    if !summary.failed_items.is_empty() {
        writeln!(out, "\nFailed downloads:")?;
        for failed in &summary.failed_items {
            writeln!(out, "  ✗ Model {}: {}", failed.item, failed.error)?;
        }
    }
    Ok(())
}

pub fn write_details(out: &mut impl Write, results: &[DownloadResult]) -> io::Result<()> {
    writeln!(out, "\n{}\nDETAILED RESULTS\n{}", RULE, RULE)?;

    for (i, result) in results.iter().enumerate() {
        if result.success {
            writeln!(
                out,
                "\n{}. ✓ {}",
                i + 1,
                result.model_name.as_deref().unwrap_or("Unknown")
            )?;
            if let Some(dir) = &result.target_directory {
                writeln!(out, "   Location: {}", dir.display())?;
            }
            writeln!(out, "   Files: {}", result.downloaded_files.categories().join(", "))?;
        } else {
            writeln!(out, "\n{}. ✗ Model {}", i + 1, result.label())?;
            writeln!(
                out,
                "   Error: {}",
                result.error.as_deref().unwrap_or("Unknown error")
            )?;
        }
    }
    Ok(())
}

/// First [`LIBRARY_PREVIEW`] downloads, plus a count of the rest.
pub fn write_library(
    out: &mut impl Write,
    summaries: &[DownloadSummary],
    total_found: usize,
) -> io::Result<()> {
    if total_found == 0 {
        return writeln!(out, "\nNo existing downloads found.");
    }

    writeln!(out, "\nFound {} existing downloads:", total_found)?;
    for s in summaries.iter().take(LIBRARY_PREVIEW) {
        writeln!(out, "  • {} ({}) - {}", s.model_name, s.model_type, s.downloaded_at)?;
    }
    if total_found > LIBRARY_PREVIEW {
        writeln!(out, "  ... and {} more", total_found - LIBRARY_PREVIEW)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::DownloadedFiles;
    use std::path::PathBuf;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn results() -> Vec<DownloadResult> {
        vec![
            DownloadResult {
                success: true,
                model_name: Some("Foo Bar".into()),
                model_id: Some("1".into()),
                target_directory: Some(PathBuf::from("/lib/SDXL/Base/Lora/Foo_Bar_1_9")),
                downloaded_files: DownloadedFiles {
                    model_file: Some("foo.safetensors".into()),
                    html_info: Some("Foo_Bar_1_9_info.html".into()),
                    ..Default::default()
                },
                ..Default::default()
            },
            DownloadResult::failed("Failed to fetch model information.", "2", None),
        ]
    }

    #[test]
    fn summary_lists_successes_and_failures() {
        let summary = BatchSummary::from_results(&results());
        let text = render(|out| write_summary(out, &summary));
        assert!(text.contains("DOWNLOAD SUMMARY"));
        assert!(text.contains("Success rate: 50.0%"));
        assert!(text.contains("✓ Foo Bar"));
        assert!(text.contains("✗ Model 2: Failed to fetch model information."));
    }

    #[test]
    fn details_show_location_and_categories() {
        let text = render(|out| write_details(out, &results()));
        assert!(text.contains("DETAILED RESULTS"));
        assert!(text.contains("1. ✓ Foo Bar"));
        assert!(text.contains("Location: /lib/SDXL/Base/Lora/Foo_Bar_1_9"));
        assert!(text.contains("Files: model_file, html_info"));
        assert!(text.contains("2. ✗ Model 2"));
    }

    #[test]
    fn library_listing_truncates() {
        let summaries: Vec<DownloadSummary> = (0..12)
            .map(|i| DownloadSummary {
                model_name: format!("M{}", i),
                model_type: "LORA".into(),
                version_name: "v1".into(),
                base_model: "SD 1.5".into(),
                downloaded_at: "2024-01-01".into(),
                original_url: None,
                location: PathBuf::from("/lib"),
                preview_image: None,
            })
            .collect();
        let text = render(|out| write_library(out, &summaries, summaries.len()));
        assert!(text.contains("Found 12 existing downloads"));
        assert!(text.contains("• M9 (LORA)"));
        assert!(!text.contains("• M10 "));
        assert!(text.contains("... and 2 more"));

        let empty = render(|out| write_library(out, &[], 0));
        assert!(empty.contains("No existing downloads found."));
    }
}
