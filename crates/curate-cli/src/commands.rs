use std::collections::BTreeMap;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use curate_cli::pipeline::{
    NormalizeOptions, PrepareOptions, RecodeOptions, Relocation, SampleOptions, compose_maps,
    list_dictionaries, run_prepare, scan_to_file,
};
use curate_cli::types::{DictionaryRow, PrepareResult, RecodeResult, ScanResult};
use curate_ingest::{FILE_PATH_COLUMN, LABEL_COLUMN, ScanOptions};
use curate_model::{ColumnConfig, MatchMode, UnmappedPolicy};
use curate_output::{DelimitedOptions, parse_separator};
use curate_relocate::InteractiveCredentials;

use crate::cli::{DictionariesArgs, MatchModeArg, PrepareArgs, RecodeArgs, ScanArgs};

pub fn run_prepare_command(args: &PrepareArgs) -> Result<PrepareResult> {
    let options = prepare_options(args)?;
    let progress = file_progress()?;
    let mut credentials = InteractiveCredentials::new();
    run_prepare(&options, &mut credentials, &progress)
}

pub fn run_dictionaries(args: &DictionariesArgs) -> Result<Vec<DictionaryRow>> {
    list_dictionaries(&args.root)
}

pub fn run_recode(args: &RecodeArgs) -> Result<RecodeResult> {
    compose_maps(&args.labels, &args.numeric, &args.output)
}

pub fn run_scan(args: &ScanArgs) -> Result<ScanResult> {
    let suffixes: BTreeMap<String, String> = args.suffixes.iter().cloned().collect();
    let options = ScanOptions::new(args.extension.as_str(), suffixes)
        .with_separator(args.stem_separator);
    let write = DelimitedOptions::default()
        .with_columns(vec![FILE_PATH_COLUMN.to_string(), LABEL_COLUMN.to_string()])
        .with_separator(separator(&args.output_separator)?)
        .with_header(args.header);
    scan_to_file(&args.root, &options, &args.output, &write)
}

fn prepare_options(args: &PrepareArgs) -> Result<PrepareOptions> {
    let mut options = PrepareOptions::new(&args.metadata, &args.output);
    options.separator = separator(&args.separator)?;
    options.columns =
        ColumnConfig::new(&args.path_column, &args.label_column).with_uid(&args.uid_column);
    options.filters = args.filters.clone();
    options.excludes = args.excludes.clone();
    options.exclude_containing = args.exclude_containing.clone();
    options.drop_missing = args.drop_missing.clone();
    options.normalize = args.acronyms.as_ref().map(|acronyms| NormalizeOptions {
        acronyms: acronyms.clone(),
        mode: match args.match_mode {
            MatchModeArg::Absolute => MatchMode::Absolute,
            MatchModeArg::Relative => MatchMode::Relative,
            MatchModeArg::AbsoluteThenRelative => MatchMode::AbsoluteThenRelative,
        },
        policy: if args.keep_unmapped {
            UnmappedPolicy::KeepRaw
        } else {
            UnmappedPolicy::Null
        },
        diagnostics_dir: Some(args.diagnostics_dir.clone()),
    });
    options.drop_unmapped = args.drop_unmapped;
    options.recode = match (&args.numeric_map, &args.label_index) {
        (Some(numeric), _) => RecodeOptions::Numeric {
            numeric: numeric.clone(),
            labels: args.label_map.clone(),
        },
        (None, Some(output)) => RecodeOptions::LabelIndex {
            output: output.clone(),
        },
        (None, None) => RecodeOptions::Off,
    };
    options.sample = args.sample.map(|per_label| SampleOptions {
        per_label,
        seed: args.seed,
    });
    options.root = args.add_root.clone();
    options.relocation = match (&args.move_to, &args.migrate_to) {
        (Some(dir), _) => Relocation::Move(dir.clone()),
        (None, Some(dir)) => Relocation::Migrate(dir.clone()),
        (None, None) => Relocation::Keep,
    };
    options.renames = args.renames.iter().cloned().collect();

    let mut write = DelimitedOptions::default()
        .with_separator(separator(&args.output_separator)?)
        .with_header(args.header)
        .with_index(args.index);
    if !args.columns.is_empty() {
        write = write.with_columns(args.columns.clone());
    }
    options.write = write;
    Ok(options)
}

fn separator(value: &str) -> Result<u8> {
    parse_separator(value).with_context(|| format!("invalid separator `{value}`"))
}

fn file_progress() -> Result<ProgressBar> {
    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({eta})")
            .context("progress bar template")?
            .progress_chars("#>-"),
    );
    Ok(progress)
}
