//! Bookkeeping of a normalization pass.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use curate_output::{write_json_indented, write_lines};

use crate::error::Result;

/// Raw labels that matched no dictionary entry, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnmappedLedger {
    labels: Vec<String>,
}

impl UnmappedLedger {
    /// Records `label`; returns false when it was already present.
    pub fn record(&mut self, label: &str) -> bool {
        if self.labels.iter().any(|existing| existing == label) {
            return false;
        }
        self.labels.push(label.to_string());
        true
    }

    pub fn clear(&mut self) {
        self.labels.clear();
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Writes one label per line.
    pub fn persist(&self, path: &Path) -> Result<PathBuf> {
        Ok(write_lines(path, &self.labels)?)
    }
}

/// Canonical label -> raw labels it absorbed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingLedger {
    mappings: BTreeMap<String, Vec<String>>,
}

impl MappingLedger {
    /// Records that `raw` resolved to `canonical`; returns false for repeats.
    pub fn record(&mut self, canonical: &str, raw: &str) -> bool {
        let absorbed = self.mappings.entry(canonical.to_string()).or_default();
        if absorbed.iter().any(|existing| existing == raw) {
            return false;
        }
        absorbed.push(raw.to_string());
        true
    }

    pub fn clear(&mut self) {
        self.mappings.clear();
    }

    pub fn mappings(&self) -> &BTreeMap<String, Vec<String>> {
        &self.mappings
    }

    /// Canonical labels that absorbed at least one raw label.
    pub fn canonical_labels(&self) -> impl Iterator<Item = &str> {
        self.mappings.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Writes the ledger as a JSON object with 4-space indentation.
    pub fn persist(&self, path: &Path) -> Result<PathBuf> {
        Ok(write_json_indented(path, &self.mappings)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmapped_deduplicates() {
        let mut ledger = UnmappedLedger::default();
        assert!(ledger.record("zzz"));
        assert!(!ledger.record("zzz"));
        assert!(ledger.record("yyy"));
        assert_eq!(ledger.labels(), &["zzz".to_string(), "yyy".to_string()]);
    }

    #[test]
    fn mapping_deduplicates_per_key() {
        let mut ledger = MappingLedger::default();
        assert!(ledger.record("T2", "t2w"));
        assert!(!ledger.record("T2", "t2w"));
        assert!(ledger.record("ADC", "t2w"));
        assert_eq!(ledger.mappings().get("T2").unwrap().len(), 1);
        assert_eq!(ledger.canonical_labels().collect::<Vec<_>>(), vec!["ADC", "T2"]);
    }
}
