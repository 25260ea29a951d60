//! Command pipelines.
//!
//! `prepare` runs the stages in a fixed order:
//!
//! ```text
//! load -> filter -> exclude -> drop missing -> normalize -> recode
//!      -> sample -> add root -> move | migrate -> rename -> write
//! ```
//!
//! Each stage is skipped when its options are unset.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use curate_ingest::{LABEL_COLUMN, ScanOptions, scan_labelled_files};
use curate_map::{
    DictionarySet, LabelMap, LabelNormalizer, NormalizerOptions, RecodeTable, load_label_map,
    load_numeric_map, unmatched_keys,
};
use curate_model::{ColumnConfig, MatchMode, UnmappedPolicy};
use curate_output::{DelimitedOptions, write_delimited, write_json_indented};
use curate_relocate::CredentialProvider;
use curate_store::MetadataStore;
use indicatif::ProgressBar;
use tracing::{info, info_span, warn};

use crate::types::{
    DictionaryRow, PrepareResult, RecodeResult, RelocationSummary, ScanResult, StageCount,
};

/// Label normalization settings.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Acronym root holding `absolute/` and `relative/` dictionaries.
    pub acronyms: PathBuf,
    pub mode: MatchMode,
    pub policy: UnmappedPolicy,
    pub diagnostics_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub enum RecodeOptions {
    #[default]
    Off,
    /// Ids from a canonical -> id JSON map. `labels` maps canonical labels to
    /// the labels found in the store and is only allowed without
    /// normalization; otherwise each present label maps to itself.
    Numeric {
        numeric: PathBuf,
        labels: Option<PathBuf>,
    },
    /// Ids `0..N-1` over the sorted labels present after normalization,
    /// written to `output`.
    LabelIndex { output: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleOptions {
    pub per_label: usize,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub enum Relocation {
    #[default]
    Keep,
    Move(PathBuf),
    /// Remote directory on the host named by the credential provider.
    Migrate(String),
}

#[derive(Debug, Clone)]
pub struct PrepareOptions {
    pub metadata: PathBuf,
    pub separator: u8,
    pub columns: ColumnConfig,
    pub filters: Vec<(String, String)>,
    pub excludes: Vec<(String, String)>,
    pub exclude_containing: Vec<(String, String)>,
    /// Columns that must not be missing. An empty list skips the stage.
    pub drop_missing: Vec<String>,
    pub normalize: Option<NormalizeOptions>,
    /// Drop rows whose label is null after normalization or recoding.
    pub drop_unmapped: bool,
    pub recode: RecodeOptions,
    pub sample: Option<SampleOptions>,
    pub root: Option<PathBuf>,
    pub relocation: Relocation,
    pub renames: BTreeMap<String, String>,
    pub output: PathBuf,
    pub write: DelimitedOptions,
}

impl PrepareOptions {
    pub fn new(metadata: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            metadata: metadata.into(),
            separator: b',',
            columns: ColumnConfig::default(),
            filters: Vec::new(),
            excludes: Vec::new(),
            exclude_containing: Vec::new(),
            drop_missing: Vec::new(),
            normalize: None,
            drop_unmapped: false,
            recode: RecodeOptions::Off,
            sample: None,
            root: None,
            relocation: Relocation::Keep,
            renames: BTreeMap::new(),
            output: output.into(),
            write: DelimitedOptions::default(),
        }
    }
}

struct StageLog {
    stages: Vec<StageCount>,
}

impl StageLog {
    fn record(&mut self, stage: impl Into<String>, removed: usize, store: &MetadataStore) {
        self.stages.push(StageCount {
            stage: stage.into(),
            removed,
            remaining: store.height(),
        });
    }
}

/// Runs the `prepare` pipeline.
///
/// `provider` is only consulted for [`Relocation::Migrate`].
pub fn run_prepare(
    options: &PrepareOptions,
    provider: &mut dyn CredentialProvider,
    progress: &ProgressBar,
) -> Result<PrepareResult> {
    let span = info_span!("prepare", metadata = %options.metadata.display());
    let _guard = span.enter();

    if options.normalize.is_some()
        && matches!(&options.recode, RecodeOptions::Numeric { labels: Some(_), .. })
    {
        bail!("a label map cannot be combined with normalization");
    }

    let mut store = MetadataStore::from_csv(
        &options.metadata,
        options.separator,
        options.columns.clone(),
    )
    .context("load metadata")?;
    let source_rows = store.height();
    let mut log = StageLog { stages: Vec::new() };

    for (column, value) in &options.filters {
        let removed = store.filter_by_key(column, value)?;
        log.record(format!("filter {column}"), removed, &store);
    }
    for (column, value) in &options.excludes {
        let removed = store.exclude_by_key(column, value)?;
        log.record(format!("exclude {column}"), removed, &store);
    }
    for (column, keyword) in &options.exclude_containing {
        let removed = store.exclude_containing(column, keyword)?;
        log.record(format!("exclude keyword in {column}"), removed, &store);
    }
    if !options.drop_missing.is_empty() {
        let removed = store.remove_nan(Some(options.drop_missing.as_slice()))?;
        log.record("drop missing", removed, &store);
    }

    let normalization = match &options.normalize {
        Some(normalize) => {
            let dictionaries = DictionarySet::load(&normalize.acronyms)
                .with_context(|| format!("load dictionaries from {}", normalize.acronyms.display()))?;
            let normalizer_options = NormalizerOptions::default()
                .with_mode(normalize.mode)
                .with_diagnostics_dir(normalize.diagnostics_dir.clone());
            let mut normalizer = LabelNormalizer::new(dictionaries, normalizer_options);
            let report = store.relabel(&mut normalizer, normalize.policy)?;
            if options.drop_unmapped {
                drop_null_labels(&mut store, &mut log, "drop unmapped")?;
            }
            Some(report)
        }
        None => None,
    };

    let (missing_ids, label_index) = recode(&mut store, &options.recode)?;
    if !matches!(options.recode, RecodeOptions::Off) && options.drop_unmapped {
        drop_null_labels(&mut store, &mut log, "drop without id")?;
    }

    if let Some(sample) = options.sample {
        let removed = store.sample_per_label(sample.per_label, sample.seed)?;
        log.record(format!("sample {} per label", sample.per_label), removed, &store);
    }

    if let Some(root) = &options.root {
        store.add_root_to_path(root)?;
    }

    let relocation = match &options.relocation {
        Relocation::Keep => None,
        Relocation::Move(target) => {
            let failed = store
                .move_files(target, progress)
                .with_context(|| format!("move files to {}", target.display()))?;
            Some(RelocationSummary {
                target: target.display().to_string(),
                relocated: store.height() - failed,
                failed,
            })
        }
        Relocation::Migrate(remote_root) => {
            let failed = store
                .migrate_files(provider, remote_root, progress)
                .with_context(|| format!("migrate files to {remote_root}"))?;
            Some(RelocationSummary {
                target: remote_root.clone(),
                relocated: store.height() - failed,
                failed,
            })
        }
    };

    if !options.renames.is_empty() {
        store.rename_columns(&options.renames)?;
    }

    let output = store
        .write(&options.output, &options.write)
        .with_context(|| format!("write {}", options.output.display()))?;
    info!(
        path = %output.display(),
        rows = store.height(),
        "wrote processed metadata"
    );

    Ok(PrepareResult {
        source_rows,
        stages: log.stages,
        normalization,
        missing_ids,
        label_index,
        relocation,
        output,
        output_rows: store.height(),
    })
}

fn drop_null_labels(store: &mut MetadataStore, log: &mut StageLog, stage: &str) -> Result<()> {
    let label = [store.columns().label.clone()];
    let removed = store.remove_nan(Some(label.as_slice()))?;
    log.record(stage, removed, store);
    Ok(())
}

fn recode(
    store: &mut MetadataStore,
    options: &RecodeOptions,
) -> Result<(Vec<String>, Option<PathBuf>)> {
    let (labels, numeric, index_path) = match options {
        RecodeOptions::Off => return Ok((Vec::new(), None)),
        RecodeOptions::Numeric { numeric, labels } => {
            let numeric = load_numeric_map(numeric)
                .with_context(|| format!("load numeric map {}", numeric.display()))?;
            let labels = match labels {
                Some(path) => load_label_map(path)
                    .with_context(|| format!("load label map {}", path.display()))?,
                None => identity_map(store)?,
            };
            let unmatched = unmatched_keys(&labels, &numeric);
            if !unmatched.is_empty() {
                warn!(keys = unmatched.len(), "label and numeric maps disagree");
            }
            (labels, numeric, None)
        }
        RecodeOptions::LabelIndex { output } => {
            let index = store.label_index()?;
            let path = write_json_indented(output, &index)
                .with_context(|| format!("write label index {}", output.display()))?;
            info!(labels = index.len(), path = %path.display(), "wrote label index");
            (identity_map(store)?, index, Some(path))
        }
    };
    let table = RecodeTable::compose(&labels, &numeric);
    let missing = store.recode_labels(&table)?;
    Ok((missing, index_path))
}

/// Each label present in the store mapped to itself.
fn identity_map(store: &MetadataStore) -> Result<LabelMap> {
    Ok(store
        .unique_labels()?
        .into_iter()
        .map(|label| (label.clone(), vec![label]))
        .collect())
}

/// Canonical labels and entry counts of an acronym root.
pub fn list_dictionaries(root: &Path) -> Result<Vec<DictionaryRow>> {
    let set = DictionarySet::load(root)
        .with_context(|| format!("load dictionaries from {}", root.display()))?;
    let mut rows = Vec::new();
    for (mode, dictionary) in [("absolute", &set.absolute), ("relative", &set.relative)] {
        for (label, entries) in dictionary.entries() {
            rows.push(DictionaryRow {
                mode,
                label: label.clone(),
                entries: entries.len(),
            });
        }
    }
    Ok(rows)
}

/// Composes a label map and a numeric map into an id -> labels JSON file.
pub fn compose_maps(labels: &Path, numeric: &Path, output: &Path) -> Result<RecodeResult> {
    let labels = load_label_map(labels)
        .with_context(|| format!("load label map {}", labels.display()))?;
    let numeric = load_numeric_map(numeric)
        .with_context(|| format!("load numeric map {}", numeric.display()))?;
    let unmatched = unmatched_keys(&labels, &numeric);
    if !unmatched.is_empty() {
        warn!(keys = unmatched.len(), "keys present in only one map were dropped");
    }

    let table = RecodeTable::compose(&labels, &numeric);
    let output = write_json_indented(output, table.ids())
        .with_context(|| format!("write recode table {}", output.display()))?;
    Ok(RecodeResult {
        output,
        ids: table.len(),
        raw_labels: table.ids().values().map(Vec::len).sum(),
        unmatched,
    })
}

/// Scans `root` for labelled files and writes the `file_path,label` table.
pub fn scan_to_file(
    root: &Path,
    options: &ScanOptions,
    output: &Path,
    write: &DelimitedOptions,
) -> Result<ScanResult> {
    let frame = scan_labelled_files(root, options)
        .with_context(|| format!("scan {}", root.display()))?;

    let mut per_label: BTreeMap<String, usize> = BTreeMap::new();
    for label in curate_common::column_values(&frame, LABEL_COLUMN)?
        .into_iter()
        .flatten()
    {
        *per_label.entry(label).or_default() += 1;
    }

    let output = write_delimited(&frame, output, write)
        .with_context(|| format!("write {}", output.display()))?;
    Ok(ScanResult {
        output,
        files: frame.height(),
        per_label: per_label.into_iter().collect(),
    })
}
