use crate::output::OutputWriter;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Result of processing a single file in a batch
#[derive(Debug, Clone)]
pub struct FileProcessingResult {
    pub path: PathBuf,
    pub format_name: String,
    pub error: Option<String>,
    pub item_id: Option<String>,
}

impl FileProcessingResult {
    pub fn success(path: PathBuf, format_name: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            path,
            format_name: format_name.into(),
            error: None,
            item_id: Some(item_id.into()),
        }
    }

    pub fn failure(path: PathBuf, format_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            path,
            format_name: format_name.into(),
            error: Some(error.into()),
            item_id: None,
        }
    }
}

/// Summary of batch processing results
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub total_files: usize,
    pub successful: Vec<FileProcessingResult>,
    pub failed: Vec<FileProcessingResult>,
}

impl BatchSummary {
    pub fn new(total_files: usize) -> Self {
        Self { total_files, ..Default::default() }
    }

    pub fn add_success(&mut self, result: FileProcessingResult) {
        self.successful.push(result);
    }

    pub fn add_failure(&mut self, result: FileProcessingResult) {
        self.failed.push(result);
    }

    pub fn success_count(&self) -> usize {
        self.successful.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    /// Successes and failures per source format
    pub fn summary_by_format(&self) -> BTreeMap<String, FormatSummary> {
        let mut format_summaries: BTreeMap<String, FormatSummary> = BTreeMap::new();

        for result in &self.successful {
            format_summaries.entry(result.format_name.clone()).or_default().successful += 1;
        }
        for result in &self.failed {
            format_summaries.entry(result.format_name.clone()).or_default().failed += 1;
        }

        format_summaries
    }

    pub fn display(&self, output: &OutputWriter) {
        output.section("Batch Summary");
        output.kv("Total Files", self.total_files);
        output.kv("Successful", self.success_count());
        output.kv("Failed", self.failure_count());

        let format_summaries = self.summary_by_format();
        if format_summaries.len() > 1 {
            output.section("By Format");
            for (format_name, summary) in &format_summaries {
                output.kv(
                    format_name,
                    format!("{} successful, {} failed", summary.successful, summary.failed),
                );
            }
        }

        if !self.successful.is_empty() {
            output.section("Added Items");
            for result in &self.successful {
                output.info(format!(
                    "{} - {}",
                    result.path.display(),
                    result.item_id.as_deref().unwrap_or("unknown"),
                ));
            }
        }

        if !self.failed.is_empty() {
            output.section("Failed Files");
            for result in &self.failed {
                output.error(format!(
                    "{} ({}) - {}",
                    result.path.display(),
                    result.format_name,
                    result.error.as_deref().unwrap_or("unknown error"),
                ));
            }
        }
    }
}

/// Processing results for one format
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatSummary {
    pub successful: usize,
    pub failed: usize,
}
