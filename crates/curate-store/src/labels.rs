//! Label column rewrites.

use std::collections::BTreeSet;

use curate_map::{
    BatchReport, LabelNormalizer, NormalizedLabel, NumericMap, RecodeTable, build_label_index,
};
use curate_model::UnmappedPolicy;
use polars::prelude::*;
use tracing::{info, warn};

use crate::error::Result;
use crate::store::MetadataStore;

impl MetadataStore {
    /// Replaces raw labels with canonical ones.
    ///
    /// Null labels stay null and are not fed to the normalizer. `policy`
    /// decides what unmapped labels become.
    pub fn relabel(
        &mut self,
        normalizer: &mut LabelNormalizer,
        policy: UnmappedPolicy,
    ) -> Result<BatchReport> {
        let raw = self.label_values()?;
        let outcome = normalizer.normalize_batch(raw.iter().flatten().map(String::as_str))?;

        let mut normalized = outcome.labels.into_iter();
        let relabelled: Vec<Option<String>> = raw
            .into_iter()
            .map(|cell| {
                let raw = cell?;
                match normalized.next() {
                    Some(NormalizedLabel::Canonical(label)) => Some(label),
                    Some(NormalizedLabel::Unmapped) | None => match policy {
                        UnmappedPolicy::KeepRaw => Some(raw),
                        UnmappedPolicy::Null => None,
                    },
                }
            })
            .collect();

        self.replace_column(Series::new(self.columns.label.as_str().into(), relabelled))?;
        Ok(outcome.report)
    }

    /// Replaces labels with their numeric ids.
    ///
    /// Labels without an id become null. Returns those labels, deduplicated.
    pub fn recode_labels(&mut self, table: &RecodeTable) -> Result<Vec<String>> {
        let raw = self.label_values()?;
        let (ids, missing) = table.recode(raw.iter().flatten().map(String::as_str));

        let mut ids = ids.into_iter();
        let recoded: Vec<Option<i64>> = raw
            .iter()
            .map(|cell| cell.as_ref().and_then(|_| ids.next().flatten()))
            .collect();

        self.replace_column(Series::new(self.columns.label.as_str().into(), recoded))?;
        if missing.is_empty() {
            info!(rows = self.height(), "recoded all labels");
        } else {
            warn!(labels = missing.len(), "labels without a numeric id");
        }
        Ok(missing)
    }

    /// Distinct non-null labels, sorted.
    pub fn unique_labels(&self) -> Result<Vec<String>> {
        let labels: BTreeSet<String> = self.label_values()?.into_iter().flatten().collect();
        Ok(labels.into_iter().collect())
    }

    /// Ids `0..N-1` for the distinct labels currently in the store.
    pub fn label_index(&self) -> Result<NumericMap> {
        let labels = self.unique_labels()?;
        Ok(build_label_index(labels.iter().map(String::as_str)))
    }
}
