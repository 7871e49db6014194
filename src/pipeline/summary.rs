//! Batch totals for the end-of-run report.

use super::processor::DownloadResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedItem {
    pub item: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub total_processed: usize,
    pub successful: usize,
    pub failed: usize,
    /// Percentage, 0 for an empty batch.
    pub success_rate: f64,
    pub successful_models: Vec<String>,
    pub failed_items: Vec<FailedItem>,
}

impl BatchSummary {
    pub fn from_results(results: &[DownloadResult]) -> Self {
        let (ok, failed): (Vec<&DownloadResult>, Vec<&DownloadResult>) =
            results.iter().partition(|r| r.success);

        let success_rate = if results.is_empty() {
            0.0
        } else {
            ok.len() as f64 / results.len() as f64 * 100.0
        };

        Self {
            total_processed: results.len(),
            successful: ok.len(),
            failed: failed.len(),
            success_rate,
            successful_models: ok
                .iter()
                .map(|r| r.model_name.clone().unwrap_or_else(|| "Unknown".to_string()))
                .collect(),
            failed_items: failed
                .iter()
                .map(|r| FailedItem {
                    item: r.label().to_string(),
                    error: r.error.clone().unwrap_or_else(|| "Unknown".to_string()),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(name: &str) -> DownloadResult {
        DownloadResult {
            success: true,
            model_name: Some(name.to_string()),
            model_id: Some("1".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn empty_batch_has_zero_rate() {
        let s = BatchSummary::from_results(&[]);
        assert_eq!(s.total_processed, 0);
        assert_eq!(s.success_rate, 0.0);
    }

    #[test]
    fn counts_and_rate() {
        let results = vec![
            ok("A"),
            DownloadResult::failed("Failed to fetch model information.", "7", None),
            ok("B"),
            ok("C"),
        ];
        let s = BatchSummary::from_results(&results);
        assert_eq!(s.total_processed, 4);
        assert_eq!(s.successful, 3);
        assert_eq!(s.failed, 1);
        assert_eq!(s.success_rate, 75.0);
        assert_eq!(s.successful_models, vec!["A", "B", "C"]);
        assert_eq!(
            s.failed_items,
            vec![FailedItem {
                item: "7".into(),
                error: "Failed to fetch model information.".into()
            }]
        );
    }
}
