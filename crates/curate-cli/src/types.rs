use std::path::PathBuf;

use curate_map::BatchReport;

/// Row count after one pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageCount {
    pub stage: String,
    pub removed: usize,
    pub remaining: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RelocationSummary {
    /// Local directory or `host:dir`.
    pub target: String,
    pub relocated: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct PrepareResult {
    pub source_rows: usize,
    pub stages: Vec<StageCount>,
    pub normalization: Option<BatchReport>,
    /// Labels without a numeric id after recoding.
    pub missing_ids: Vec<String>,
    pub label_index: Option<PathBuf>,
    pub relocation: Option<RelocationSummary>,
    pub output: PathBuf,
    pub output_rows: usize,
}

impl PrepareResult {
    /// Unmapped labels or relocation failures.
    pub fn has_warnings(&self) -> bool {
        self.normalization
            .as_ref()
            .is_some_and(|report| !report.fully_mapped())
            || !self.missing_ids.is_empty()
            || self
                .relocation
                .as_ref()
                .is_some_and(|summary| summary.failed > 0)
    }
}

/// One canonical label of an acronym root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryRow {
    pub mode: &'static str,
    pub label: String,
    pub entries: usize,
}

#[derive(Debug, Clone)]
pub struct RecodeResult {
    pub output: PathBuf,
    pub ids: usize,
    pub raw_labels: usize,
    /// Keys present in only one of the input maps.
    pub unmatched: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ScanResult {
    pub output: PathBuf,
    pub files: usize,
    /// Labelled files per label, sorted by label.
    pub per_label: Vec<(String, usize)>,
}
