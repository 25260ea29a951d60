//! Row filters and per-label sampling.

use std::collections::BTreeMap;

use curate_common::{is_missing, redact_value};
use polars::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::info;

use crate::error::Result;
use crate::store::MetadataStore;

impl MetadataStore {
    /// Keeps rows whose `column` equals `value`.
    pub fn filter_by_key(&mut self, column: &str, value: &str) -> Result<usize> {
        let keep: Vec<bool> = self
            .column_text(column)?
            .iter()
            .map(|cell| cell.as_deref() == Some(value))
            .collect();
        let removed = self.retain_rows(&keep)?;
        info!(
            column,
            value = redact_value(value),
            removed,
            remaining = self.height(),
            "filtered by key"
        );
        Ok(removed)
    }

    /// Drops rows whose `column` equals `value`. Null cells are kept.
    pub fn exclude_by_key(&mut self, column: &str, value: &str) -> Result<usize> {
        let keep: Vec<bool> = self
            .column_text(column)?
            .iter()
            .map(|cell| cell.as_deref() != Some(value))
            .collect();
        let removed = self.retain_rows(&keep)?;
        info!(
            column,
            value = redact_value(value),
            removed,
            remaining = self.height(),
            "excluded by key"
        );
        Ok(removed)
    }

    /// Drops rows whose `column` contains `keyword` (case-sensitive). Null
    /// cells are kept.
    pub fn exclude_containing(&mut self, column: &str, keyword: &str) -> Result<usize> {
        let keep: Vec<bool> = self
            .column_text(column)?
            .iter()
            .map(|cell| !cell.as_deref().is_some_and(|text| text.contains(keyword)))
            .collect();
        let removed = self.retain_rows(&keep)?;
        info!(
            column,
            keyword = redact_value(keyword),
            removed,
            remaining = self.height(),
            "excluded by keyword"
        );
        Ok(removed)
    }

    /// Drops rows with a missing value (null or NaN) in any of `columns`.
    ///
    /// `None` or an empty list checks every column.
    pub fn remove_nan(&mut self, columns: Option<&[String]>) -> Result<usize> {
        let names: Vec<String> = match columns {
            Some(names) if !names.is_empty() => {
                for name in names {
                    self.require_column(name)?;
                }
                names.to_vec()
            }
            _ => self
                .processed
                .get_column_names()
                .iter()
                .map(|name| name.to_string())
                .collect(),
        };

        let mut keep = vec![true; self.height()];
        for name in &names {
            let column = self.processed.column(name)?;
            for (idx, slot) in keep.iter_mut().enumerate() {
                if *slot && is_missing(&column.get(idx).unwrap_or(AnyValue::Null)) {
                    *slot = false;
                }
            }
        }
        let removed = self.retain_rows(&keep)?;
        info!(
            columns = names.len(),
            removed,
            remaining = self.height(),
            "removed rows with missing values"
        );
        Ok(removed)
    }

    /// Keeps a random subset of at most `per_label` rows for each label, then
    /// shuffles the rows.
    ///
    /// Rows with a null label are dropped. A seed makes the draw reproducible.
    pub fn sample_per_label(&mut self, per_label: usize, seed: Option<u64>) -> Result<usize> {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (idx, label) in self.label_values()?.into_iter().enumerate() {
            if let Some(label) = label {
                groups.entry(label).or_default().push(idx);
            }
        }

        let mut chosen: Vec<IdxSize> = Vec::new();
        for rows in groups.values_mut() {
            rows.shuffle(&mut rng);
            chosen.extend(rows.iter().take(per_label).map(|&idx| idx as IdxSize));
        }
        chosen.shuffle(&mut rng);

        let before = self.height();
        let take = IdxCa::from_vec("take".into(), chosen);
        self.processed = self.processed.take(&take)?;
        info!(
            per_label,
            labels = groups.len(),
            remaining = self.height(),
            "sampled rows per label"
        );
        Ok(before - self.height())
    }
}

#[cfg(test)]
mod tests {
    use curate_model::ColumnConfig;

    use crate::store::tests::sample_store;

    use super::*;

    #[test]
    fn filter_then_exclude_is_empty() {
        let mut store = sample_store();
        store.filter_by_key("Modality", "MR").unwrap();
        assert_eq!(store.height(), 2);
        store.exclude_by_key("Modality", "MR").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn exclude_keeps_null_cells() {
        let df = DataFrame::new(vec![
            Column::new("path".into(), ["/a", "/b", "/c"]),
            Column::new("label".into(), [Some("T2"), None, Some("ADC")]),
        ])
        .unwrap();
        let mut store = MetadataStore::from_frame(df, ColumnConfig::new("path", "label")).unwrap();

        let removed = store.exclude_by_key("label", "T2").unwrap();

        assert_eq!(removed, 1);
        assert_eq!(store.label_values().unwrap(), vec![None, Some("ADC".to_string())]);
    }

    #[test]
    fn exclude_containing_is_case_sensitive() {
        let mut store = sample_store();
        store.exclude_containing("Series Description", "t2").unwrap();
        assert_eq!(store.label_values().unwrap(), vec![Some("ADC".to_string())]);
    }

    #[test]
    fn remove_nan_checks_selected_or_all_columns() {
        let df = DataFrame::new(vec![
            Column::new("path".into(), [Some("/a"), Some("/b"), None]),
            Column::new("label".into(), [Some("T2"), None, Some("ADC")]),
            Column::new("score".into(), [1.0, f64::NAN, 2.0]),
        ])
        .unwrap();
        let columns = ColumnConfig::new("path", "label");

        let mut store = MetadataStore::from_frame(df.clone(), columns.clone()).unwrap();
        store.remove_nan(Some(["label".to_string()].as_slice())).unwrap();
        assert_eq!(store.height(), 2);

        let mut store = MetadataStore::from_frame(df, columns).unwrap();
        let removed = store.remove_nan(None).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.path_values().unwrap().len(), 1);
    }

    #[test]
    fn sampling_caps_each_label_and_is_seeded() {
        let paths: Vec<String> = (0..10).map(|i| format!("/a/{i}.dcm")).collect();
        let labels: Vec<&str> = (0..10).map(|i| if i < 7 { "T2" } else { "ADC" }).collect();
        let df = DataFrame::new(vec![
            Column::new("path".into(), paths),
            Column::new("label".into(), labels),
        ])
        .unwrap();
        let columns = ColumnConfig::new("path", "label");

        let mut first = MetadataStore::from_frame(df.clone(), columns.clone()).unwrap();
        first.sample_per_label(2, Some(7)).unwrap();
        let mut second = MetadataStore::from_frame(df, columns).unwrap();
        second.sample_per_label(2, Some(7)).unwrap();

        let labels = first.label_values().unwrap();
        assert_eq!(labels.len(), 4);
        assert_eq!(labels.iter().filter(|l| l.as_deref() == Some("T2")).count(), 2);
        assert_eq!(first.path_values().unwrap(), second.path_values().unwrap());
    }

    #[test]
    fn revert_restores_source() {
        let mut store = sample_store();
        store.filter_by_key("Modality", "CT").unwrap();
        store.revert_to_original();
        assert!(store.processed().equals(store.source()));
    }
}
