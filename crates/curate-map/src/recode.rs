//! Numeric label recoding.
//!
//! A label map sends canonical labels to the raw labels they cover
//! (`{"T2": ["t2w", "T2W"]}`); a numeric map sends canonical labels to class
//! ids (`{"T2": 0}`). Their composition is the recode table
//! (`{0: ["t2w", "T2W"]}`) used to finalize labels for training.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{MapError, Result};

/// Canonical label -> raw labels.
pub type LabelMap = BTreeMap<String, Vec<String>>;
/// Canonical label -> numeric id.
pub type NumericMap = BTreeMap<String, i64>;

/// Numeric id -> raw labels, with a reverse index for lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecodeTable {
    by_id: BTreeMap<i64, Vec<String>>,
    by_raw: BTreeMap<String, i64>,
}

impl RecodeTable {
    /// Composes a label map with a numeric map.
    ///
    /// Only canonical labels present in both maps contribute. Canonical labels
    /// sharing one id are merged under it. Use [`unmatched_keys`] beforehand
    /// when a mismatch must be treated as an error.
    pub fn compose(labels: &LabelMap, numeric: &NumericMap) -> Self {
        let mut by_id: BTreeMap<i64, Vec<String>> = BTreeMap::new();
        for (canonical, id) in numeric {
            let Some(raw_labels) = labels.get(canonical) else {
                continue;
            };
            let slot = by_id.entry(*id).or_default();
            for raw in raw_labels {
                if !slot.contains(raw) {
                    slot.push(raw.clone());
                }
            }
        }
        Self::from_ids(by_id)
    }

    /// Builds a table from an already composed id -> raw labels map.
    pub fn from_ids(by_id: BTreeMap<i64, Vec<String>>) -> Self {
        let mut by_raw = BTreeMap::new();
        for (id, raw_labels) in &by_id {
            for raw in raw_labels {
                by_raw.entry(raw.clone()).or_insert(*id);
            }
        }
        Self { by_id, by_raw }
    }

    /// Exact, case-sensitive lookup of a raw label.
    pub fn lookup(&self, raw: &str) -> Option<i64> {
        self.by_raw.get(raw).copied()
    }

    /// Recodes a sequence of labels.
    ///
    /// Returns the numeric labels (`None` where a label has no entry) and the
    /// distinct labels that had no entry, in first-seen order.
    pub fn recode<'a, I>(&self, labels: I) -> (Vec<Option<i64>>, Vec<String>)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut missing: Vec<String> = Vec::new();
        let recoded = labels
            .into_iter()
            .map(|raw| {
                let id = self.lookup(raw);
                if id.is_none() && !missing.iter().any(|m| m == raw) {
                    missing.push(raw.to_string());
                }
                id
            })
            .collect();
        (recoded, missing)
    }

    pub fn ids(&self) -> &BTreeMap<i64, Vec<String>> {
        &self.by_id
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Canonical labels present in only one of the two maps, sorted.
pub fn unmatched_keys(labels: &LabelMap, numeric: &NumericMap) -> Vec<String> {
    let left: BTreeSet<&String> = labels.keys().collect();
    let right: BTreeSet<&String> = numeric.keys().collect();
    left.symmetric_difference(&right)
        .map(|key| (*key).clone())
        .collect()
}

/// Assigns ids `0..N-1` to the distinct labels, in lexicographic order.
pub fn build_label_index<'a, I>(labels: I) -> NumericMap
where
    I: IntoIterator<Item = &'a str>,
{
    let distinct: BTreeSet<&str> = labels.into_iter().collect();
    distinct
        .into_iter()
        .zip(0_i64..)
        .map(|(label, id)| (label.to_string(), id))
        .collect()
}

pub fn load_label_map(path: &Path) -> Result<LabelMap> {
    load_json(path)
}

pub fn load_numeric_map(path: &Path) -> Result<NumericMap> {
    load_json(path)
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path).map_err(|source| MapError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| MapError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn label_map(entries: &[(&str, &[&str])]) -> LabelMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
            .collect()
    }

    fn numeric_map(entries: &[(&str, i64)]) -> NumericMap {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn compose_keeps_shared_keys_only() {
        let a = label_map(&[("T2", &["t2w", "T2W"]), ("ADC", &["adc"])]);
        let b = numeric_map(&[("T2", 0), ("DWI", 1)]);
        let table = RecodeTable::compose(&a, &b);
        let mut expected = BTreeMap::new();
        expected.insert(0, vec!["t2w".to_string(), "T2W".to_string()]);
        assert_eq!(table.ids(), &expected);
        assert_eq!(unmatched_keys(&a, &b), vec!["ADC".to_string(), "DWI".to_string()]);
    }

    #[test]
    fn shared_ids_merge() {
        let a = label_map(&[("DWI", &["dwi"]), ("ADC", &["adc"])]);
        let b = numeric_map(&[("DWI", 3), ("ADC", 3)]);
        let table = RecodeTable::compose(&a, &b);
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("dwi"), Some(3));
        assert_eq!(table.lookup("adc"), Some(3));
    }

    #[test]
    fn recode_reports_missing_once() {
        let a = label_map(&[("T2", &["t2w"])]);
        let table = RecodeTable::compose(&a, &numeric_map(&[("T2", 0)]));
        let (ids, missing) = table.recode(["t2w", "zzz", "zzz", "T2W"]);
        assert_eq!(ids, vec![Some(0), None, None, None]);
        assert_eq!(missing, vec!["zzz".to_string(), "T2W".to_string()]);
    }

    #[test]
    fn label_index_is_dense_and_sorted() {
        let index = build_label_index(["T2", "ADC", "T2", "DWI"]);
        assert_eq!(index, numeric_map(&[("ADC", 0), ("DWI", 1), ("T2", 2)]));
    }

    #[test]
    fn loads_maps_from_json() {
        let dir = TempDir::new().unwrap();
        let labels = dir.path().join("labels.json");
        let numeric = dir.path().join("numeric.json");
        std::fs::write(&labels, r#"{"T2": ["t2w", "T2W"]}"#).unwrap();
        std::fs::write(&numeric, r#"{"T2": 0}"#).unwrap();
        let table = RecodeTable::compose(
            &load_label_map(&labels).unwrap(),
            &load_numeric_map(&numeric).unwrap(),
        );
        assert_eq!(table.lookup("T2W"), Some(0));
    }

    #[test]
    fn invalid_json_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_numeric_map(&path), Err(MapError::Json { .. })));
    }
}
