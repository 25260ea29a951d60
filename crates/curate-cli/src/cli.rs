//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use curate_model::columns::{DEFAULT_LABEL_COLUMN, DEFAULT_PATH_COLUMN, DEFAULT_UID_COLUMN};

#[derive(Parser)]
#[command(
    name = "dicom-curate",
    version,
    about = "Prepare imaging metadata and files for a training pipeline",
    long_about = "Filter DICOM metadata tables, map noisy series descriptions onto \
                  canonical labels, recode labels to numeric ids and move or \
                  migrate the referenced files."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Log file paths and labels instead of redacting them.
    ///
    /// Paths and series descriptions may contain patient identifiers.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Filter, relabel and relocate one metadata table.
    Prepare(PrepareArgs),

    /// List the canonical labels of an acronym directory.
    Dictionaries(DictionariesArgs),

    /// Compose a label map and a numeric map into an id -> labels map.
    Recode(RecodeArgs),

    /// Label files by the suffix of their file name.
    Scan(ScanArgs),
}

#[derive(Args)]
pub struct PrepareArgs {
    /// Metadata table with a header row.
    #[arg(value_name = "METADATA")]
    pub metadata: PathBuf,

    /// Field separator of the metadata table (a character, or `tab`).
    #[arg(long = "separator", default_value = ",")]
    pub separator: String,

    #[arg(long = "path-column", default_value = DEFAULT_PATH_COLUMN)]
    pub path_column: String,

    #[arg(long = "label-column", default_value = DEFAULT_LABEL_COLUMN)]
    pub label_column: String,

    /// Identifier column, checked only when present in the table.
    #[arg(long = "uid-column", default_value = DEFAULT_UID_COLUMN)]
    pub uid_column: String,

    /// Keep rows where COLUMN equals VALUE (repeatable).
    #[arg(long = "filter", value_name = "COLUMN=VALUE", value_parser = parse_pair)]
    pub filters: Vec<(String, String)>,

    /// Drop rows where COLUMN equals VALUE (repeatable).
    #[arg(long = "exclude", value_name = "COLUMN=VALUE", value_parser = parse_pair)]
    pub excludes: Vec<(String, String)>,

    /// Drop rows where COLUMN contains KEYWORD, case-sensitive (repeatable).
    #[arg(
        long = "exclude-containing",
        value_name = "COLUMN=KEYWORD",
        value_parser = parse_pair
    )]
    pub exclude_containing: Vec<(String, String)>,

    /// Drop rows with a missing value in COLUMN (repeatable).
    #[arg(long = "drop-missing", value_name = "COLUMN")]
    pub drop_missing: Vec<String>,

    /// Acronym directory with `absolute/` and `relative/` dictionaries.
    #[arg(long = "acronyms", value_name = "DIR")]
    pub acronyms: Option<PathBuf>,

    #[arg(long = "match-mode", value_enum, default_value = "relative")]
    pub match_mode: MatchModeArg,

    /// Keep raw labels that matched no dictionary entry instead of nulling them.
    #[arg(long = "keep-unmapped", conflicts_with = "drop_unmapped")]
    pub keep_unmapped: bool,

    /// Drop rows whose label is unmapped or has no numeric id.
    #[arg(long = "drop-unmapped")]
    pub drop_unmapped: bool,

    /// Directory for `unmapped_labels.txt` and `successful_mappings.json`.
    #[arg(long = "diagnostics-dir", value_name = "DIR", default_value = ".")]
    pub diagnostics_dir: PathBuf,

    /// Canonical label -> numeric id JSON map.
    #[arg(long = "numeric-map", value_name = "JSON", conflicts_with = "label_index")]
    pub numeric_map: Option<PathBuf>,

    /// Canonical label -> raw labels JSON map, for tables that were not normalized.
    #[arg(
        long = "label-map",
        value_name = "JSON",
        requires = "numeric_map",
        conflicts_with = "acronyms"
    )]
    pub label_map: Option<PathBuf>,

    /// Number the labels 0..N-1 and write the index to JSON.
    #[arg(long = "label-index", value_name = "JSON")]
    pub label_index: Option<PathBuf>,

    /// Keep at most N random rows per label.
    #[arg(long = "sample", value_name = "N")]
    pub sample: Option<usize>,

    /// Seed for `--sample`.
    #[arg(long = "seed", requires = "sample")]
    pub seed: Option<u64>,

    /// Prefix every path with ROOT.
    #[arg(long = "add-root", value_name = "ROOT")]
    pub add_root: Option<PathBuf>,

    /// Move files under DIR and rewrite the path column.
    #[arg(long = "move-to", value_name = "DIR", conflicts_with = "migrate_to")]
    pub move_to: Option<PathBuf>,

    /// Upload files to DIR on the host named by REMOTE_HOSTNAME.
    #[arg(long = "migrate-to", value_name = "DIR")]
    pub migrate_to: Option<String>,

    /// Rename a column before writing (repeatable).
    #[arg(long = "rename", value_name = "OLD=NEW", value_parser = parse_pair)]
    pub renames: Vec<(String, String)>,

    /// Processed metadata file.
    #[arg(long = "output", short = 'o', default_value = "metadata_processed.csv")]
    pub output: PathBuf,

    /// Field separator of the output (a character, or `tab`).
    #[arg(long = "output-separator", default_value = ",")]
    pub output_separator: String,

    /// Columns to write, in order (repeatable). Defaults to every column.
    #[arg(long = "column", value_name = "NAME")]
    pub columns: Vec<String>,

    /// Write a header row.
    #[arg(long = "header")]
    pub header: bool,

    /// Prepend a row index column.
    #[arg(long = "index")]
    pub index: bool,
}

#[derive(Args)]
pub struct DictionariesArgs {
    #[arg(value_name = "ACRONYM_DIR")]
    pub root: PathBuf,
}

#[derive(Args)]
pub struct RecodeArgs {
    /// Canonical label -> raw labels.
    #[arg(long = "labels", value_name = "JSON")]
    pub labels: PathBuf,

    /// Canonical label -> numeric id.
    #[arg(long = "numeric", value_name = "JSON")]
    pub numeric: PathBuf,

    #[arg(long = "output", short = 'o', value_name = "JSON")]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct ScanArgs {
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// File extension to collect.
    #[arg(long = "extension", default_value = "mha")]
    pub extension: String,

    /// Label for a file name suffix (repeatable).
    #[arg(long = "suffix", value_name = "SUFFIX=LABEL", value_parser = parse_pair, required = true)]
    pub suffixes: Vec<(String, String)>,

    /// Separator between the tokens of a file stem.
    #[arg(long = "stem-separator", default_value_t = '_')]
    pub stem_separator: char,

    #[arg(long = "output", short = 'o', default_value = "labels.csv")]
    pub output: PathBuf,

    /// Field separator of the output (a character, or `tab`).
    #[arg(long = "output-separator", default_value = ",")]
    pub output_separator: String,

    /// Write a header row.
    #[arg(long = "header")]
    pub header: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MatchModeArg {
    Absolute,
    Relative,
    AbsoluteThenRelative,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

/// Splits `KEY=VALUE` at the first `=`.
fn parse_pair(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((key, rest)) if !key.is_empty() => Ok((key.to_string(), rest.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{value}`")),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn pairs_split_at_first_equals() {
        assert_eq!(
            parse_pair("Series Description=AX T2=FSE").unwrap(),
            ("Series Description".to_string(), "AX T2=FSE".to_string())
        );
        assert!(parse_pair("=MR").is_err());
        assert!(parse_pair("Modality").is_err());
    }

    #[test]
    fn move_and_migrate_are_exclusive() {
        let result = Cli::try_parse_from([
            "dicom-curate",
            "prepare",
            "metadata.csv",
            "--move-to",
            "/data",
            "--migrate-to",
            "/scratch",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn prepare_defaults() {
        let cli = Cli::try_parse_from(["dicom-curate", "prepare", "metadata.csv"]).unwrap();
        let Command::Prepare(args) = cli.command else {
            panic!("expected prepare");
        };
        assert_eq!(args.path_column, DEFAULT_PATH_COLUMN);
        assert_eq!(args.label_column, DEFAULT_LABEL_COLUMN);
        assert_eq!(args.diagnostics_dir, PathBuf::from("."));
        assert!(args.filters.is_empty());
        assert!(!cli.log_data);
    }
}
