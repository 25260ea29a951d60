use std::fs;

use curate_map::{
    DictionarySet, LabelNormalizer, MappingDictionary, NormalizerOptions, RecodeTable,
    build_label_index,
};
use curate_model::MatchMode;
use proptest::prelude::*;
use tempfile::TempDir;

fn in_memory() -> NormalizerOptions {
    NormalizerOptions::default().with_diagnostics_dir(None)
}

#[test]
fn dictionaries_on_disk_drive_normalization() {
    let dir = TempDir::new().unwrap();
    let relative = dir.path().join("relative");
    let absolute = dir.path().join("absolute");
    fs::create_dir_all(&relative).unwrap();
    fs::create_dir_all(&absolute).unwrap();
    fs::write(relative.join("T2.txt"), "t2\n").unwrap();
    fs::write(relative.join("DWI.txt"), "dwi\ndiff\n").unwrap();
    fs::write(absolute.join("ADC.txt"), "ADC\n").unwrap();

    let set = DictionarySet::load(dir.path()).unwrap();
    let options = in_memory().with_mode(MatchMode::AbsoluteThenRelative);
    let mut normalizer = LabelNormalizer::new(set, options);

    let outcome = normalizer
        .normalize_batch(["AX T2 FSE", "adc", "ep2d_diff_b1000", "localizer"])
        .unwrap();
    let labels: Vec<Option<&str>> = outcome.labels.iter().map(|l| l.canonical()).collect();
    assert_eq!(labels, vec![Some("T2"), Some("ADC"), Some("DWI"), None]);
    assert_eq!(outcome.report.unmapped_rows, 1);
    assert_eq!(normalizer.unmapped_labels(), &["localizer".to_string()]);
}

#[test]
fn normalized_labels_feed_recoding() {
    let dictionary = MappingDictionary::from_entries([("T2", vec!["t2"]), ("ADC", vec!["adc"])]);
    let mut normalizer = LabelNormalizer::relative(dictionary, in_memory());
    normalizer
        .normalize_batch(["T2W", "t2_tse", "ADC map"])
        .unwrap();

    let mappings = normalizer.successful_mappings().mappings().clone();
    let canonical = normalizer.unique_mapped_labels();
    let index = build_label_index(canonical.iter().map(String::as_str));
    let table = RecodeTable::compose(&mappings, &index);

    assert_eq!(table.lookup("T2W"), Some(1));
    assert_eq!(table.lookup("t2_tse"), Some(1));
    assert_eq!(table.lookup("ADC map"), Some(0));
}

fn label() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("t2w".to_string()),
        Just("AX T2".to_string()),
        Just("adc".to_string()),
        "[a-z]{3,8}",
    ]
}

proptest! {
    #[test]
    fn unmapped_labels_are_recorded_once(labels in proptest::collection::vec(label(), 0..40)) {
        let dictionary = MappingDictionary::from_entries([("T2", vec!["t2"])]);
        let mut normalizer = LabelNormalizer::relative(dictionary, in_memory());
        let outcome = normalizer
            .normalize_batch(labels.iter().map(String::as_str))
            .unwrap();

        let unmapped = normalizer.unmapped_labels();
        for (i, a) in unmapped.iter().enumerate() {
            prop_assert!(!unmapped[i + 1..].contains(a));
        }
        for (raw, normalized) in labels.iter().zip(&outcome.labels) {
            prop_assert_eq!(normalized.is_unmapped(), unmapped.contains(raw));
        }
        prop_assert_eq!(outcome.report.total, labels.len());
    }

    #[test]
    fn mapped_labels_are_recorded_once_per_key(labels in proptest::collection::vec(label(), 0..40)) {
        let dictionary = MappingDictionary::from_entries([("T2", vec!["t2"]), ("ADC", vec!["adc"])]);
        let mut normalizer = LabelNormalizer::relative(dictionary, in_memory());
        normalizer.normalize_batch(labels.iter().map(String::as_str)).unwrap();
        normalizer.normalize_batch(labels.iter().map(String::as_str)).unwrap();

        for absorbed in normalizer.successful_mappings().mappings().values() {
            for (i, raw) in absorbed.iter().enumerate() {
                prop_assert!(!absorbed[i + 1..].contains(raw));
            }
        }
    }

    #[test]
    fn label_index_is_dense(labels in proptest::collection::vec("[A-Z0-9]{1,4}", 0..30)) {
        let index = build_label_index(labels.iter().map(String::as_str));
        let mut ids: Vec<i64> = index.values().copied().collect();
        ids.sort_unstable();
        let expected: Vec<i64> = (0..ids.len() as i64).collect();
        prop_assert_eq!(ids, expected);
    }
}
