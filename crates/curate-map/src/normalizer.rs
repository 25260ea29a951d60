//! Label normalizer.
//!
//! Maps raw labels onto canonical labels and keeps two ledgers per pass: the
//! raw labels that matched nothing and, per canonical label, the raw labels it
//! absorbed. Both ledgers belong to one normalizer instance.

use std::path::PathBuf;

use curate_model::MatchMode;
use tracing::{info, warn};

use crate::dictionary::{DictionarySet, MappingDictionary};
use crate::error::Result;
use crate::ledger::{MappingLedger, UnmappedLedger};

/// Default file name of the unmapped-labels diagnostic.
pub const DEFAULT_UNMAPPED_FILE: &str = "unmapped_labels.txt";
/// Default file name of the successful-mappings diagnostic.
pub const DEFAULT_MAPPINGS_FILE: &str = "successful_mappings.json";

/// Result of normalizing one raw label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedLabel {
    Canonical(String),
    Unmapped,
}

impl NormalizedLabel {
    pub fn canonical(&self) -> Option<&str> {
        match self {
            Self::Canonical(label) => Some(label),
            Self::Unmapped => None,
        }
    }

    pub fn is_unmapped(&self) -> bool {
        matches!(self, Self::Unmapped)
    }
}

/// Options controlling matching and where diagnostics are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizerOptions {
    pub mode: MatchMode,
    /// Directory for diagnostic files. `None` keeps ledgers in memory only.
    pub diagnostics_dir: Option<PathBuf>,
    pub unmapped_file: String,
    pub mappings_file: String,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self {
            mode: MatchMode::default(),
            diagnostics_dir: Some(PathBuf::from(".")),
            unmapped_file: DEFAULT_UNMAPPED_FILE.to_string(),
            mappings_file: DEFAULT_MAPPINGS_FILE.to_string(),
        }
    }
}

impl NormalizerOptions {
    #[must_use]
    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_diagnostics_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.diagnostics_dir = dir;
        self
    }
}

/// Summary of one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub total: usize,
    pub mapped: usize,
    /// Rows whose label stayed unmapped.
    pub unmapped_rows: usize,
    /// Distinct raw labels that stayed unmapped.
    pub unmapped_labels: usize,
    pub unmapped_path: Option<PathBuf>,
    pub mappings_path: Option<PathBuf>,
}

impl BatchReport {
    pub fn fully_mapped(&self) -> bool {
        self.unmapped_rows == 0
    }
}

#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub labels: Vec<NormalizedLabel>,
    pub report: BatchReport,
}

#[derive(Debug, Clone)]
pub struct LabelNormalizer {
    dictionaries: DictionarySet,
    options: NormalizerOptions,
    unmapped: UnmappedLedger,
    successful: MappingLedger,
}

impl LabelNormalizer {
    pub fn new(dictionaries: DictionarySet, options: NormalizerOptions) -> Self {
        Self {
            dictionaries,
            options,
            unmapped: UnmappedLedger::default(),
            successful: MappingLedger::default(),
        }
    }

    /// Normalizer over a single relative dictionary.
    pub fn relative(dictionary: MappingDictionary, options: NormalizerOptions) -> Self {
        let options = options.with_mode(MatchMode::Relative);
        Self::new(DictionarySet::new(MappingDictionary::default(), dictionary), options)
    }

    /// Normalizer over a single absolute dictionary.
    pub fn absolute(dictionary: MappingDictionary, options: NormalizerOptions) -> Self {
        let options = options.with_mode(MatchMode::Absolute);
        Self::new(DictionarySet::new(dictionary, MappingDictionary::default()), options)
    }

    pub fn mode(&self) -> MatchMode {
        self.options.mode
    }

    pub fn unmapped_labels(&self) -> &[String] {
        self.unmapped.labels()
    }

    pub fn successful_mappings(&self) -> &MappingLedger {
        &self.successful
    }

    /// Canonical labels resolved so far.
    pub fn unique_mapped_labels(&self) -> Vec<String> {
        self.successful.canonical_labels().map(str::to_string).collect()
    }

    fn resolve(&self, lowered: &str) -> Option<&str> {
        match self.options.mode {
            MatchMode::Absolute => self.dictionaries.absolute.match_exact(lowered),
            MatchMode::Relative => self.dictionaries.relative.match_contains(lowered),
            MatchMode::AbsoluteThenRelative => self
                .dictionaries
                .absolute
                .match_exact(lowered)
                .or_else(|| self.dictionaries.relative.match_contains(lowered)),
        }
    }

    /// Normalizes one raw label and updates the ledgers.
    pub fn normalize(&mut self, raw: &str) -> NormalizedLabel {
        let lowered = raw.to_lowercase();
        match self.resolve(&lowered).map(str::to_string) {
            Some(canonical) => {
                self.successful.record(&canonical, raw);
                NormalizedLabel::Canonical(canonical)
            }
            None => {
                self.unmapped.record(raw);
                NormalizedLabel::Unmapped
            }
        }
    }

    /// Normalizes a batch of raw labels.
    ///
    /// The unmapped ledger is cleared first. When labels stay unmapped, both
    /// ledgers are written to the diagnostics directory (if configured).
    pub fn normalize_batch<'a, I>(&mut self, labels: I) -> Result<BatchOutcome>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.unmapped.clear();
        let normalized: Vec<NormalizedLabel> =
            labels.into_iter().map(|raw| self.normalize(raw)).collect();

        let unmapped_rows = normalized.iter().filter(|label| label.is_unmapped()).count();
        let mut report = BatchReport {
            total: normalized.len(),
            mapped: normalized.len() - unmapped_rows,
            unmapped_rows,
            unmapped_labels: self.unmapped.len(),
            ..BatchReport::default()
        };

        if self.unmapped.is_empty() {
            info!(labels = report.total, "all labels successfully mapped");
        } else {
            if let Some(dir) = &self.options.diagnostics_dir {
                let unmapped_path = self.unmapped.persist(&dir.join(&self.options.unmapped_file))?;
                let mappings_path = self
                    .successful
                    .persist(&dir.join(&self.options.mappings_file))?;
                report.unmapped_path = Some(unmapped_path);
                report.mappings_path = Some(mappings_path);
            }
            warn!(
                unmapped_labels = report.unmapped_labels,
                unmapped_rows = report.unmapped_rows,
                diagnostics = ?report.unmapped_path,
                "labels could not be mapped"
            );
        }
        Ok(BatchOutcome {
            labels: normalized,
            report,
        })
    }
}
