//! dicom-curate CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use curate_cli::logging::{LogConfig, LogFormat, init_logging};
use curate_relocate::RelocateError;
use curate_store::StoreError;
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_dictionaries, run_prepare_command, run_recode, run_scan};
use crate::summary::{
    print_dictionaries, print_prepare_summary, print_recode_summary, print_scan_summary,
};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match &cli.command {
        Command::Prepare(args) => match run_prepare_command(args) {
            Ok(result) => {
                print_prepare_summary(&result);
                0
            }
            Err(error) => report(&error),
        },
        Command::Dictionaries(args) => match run_dictionaries(args) {
            Ok(rows) => {
                print_dictionaries(&rows);
                0
            }
            Err(error) => report(&error),
        },
        Command::Recode(args) => match run_recode(args) {
            Ok(result) => {
                print_recode_summary(&result);
                0
            }
            Err(error) => report(&error),
        },
        Command::Scan(args) => match run_scan(args) {
            Ok(result) => {
                print_scan_summary(&result);
                0
            }
            Err(error) => report(&error),
        },
    };
    std::process::exit(exit_code);
}

/// Prints the error chain and returns the exit code.
fn report(error: &anyhow::Error) -> i32 {
    let declined = error.chain().any(|cause| {
        cause
            .downcast_ref::<StoreError>()
            .is_some_and(StoreError::is_declined)
            || cause
                .downcast_ref::<RelocateError>()
                .is_some_and(RelocateError::is_declined)
    });
    if declined {
        eprintln!("aborted: {error:#}");
    } else {
        eprintln!("error: {error:#}");
    }
    1
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.log_data = cli.log_data;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
