//! `gmd` command-line tool.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use gmd_cli::commands::{ImportOptions, run_convert, run_inspect, run_triggers};
use gmd_cli::logging::{LogConfig, LogFormat, init_logging};
use gmd_cli::songs::DirectorySongResolver;
use gmd_format::InferMode;
use tracing::level_filters::LevelFilter;

mod cli;
mod summary;

use crate::cli::{Cli, Command, ImportArgs, LogFormatArg, LogLevelArg};
use crate::summary::{print_convert, print_formats, print_inspect, print_triggers};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let songs = match cli.song_dirs() {
        Ok(dirs) => DirectorySongResolver::new(dirs),
        Err(error) => {
            eprintln!("error: {error:#}");
            std::process::exit(1);
        }
    };

    let result = match &cli.command {
        Command::Formats => {
            print_formats();
            Ok(())
        }
        Command::Inspect(args) => {
            let options = import_options(args.variant, &args.import);
            run_inspect(&args.path, &options, &songs).map(|report| print_inspect(&report))
        }
        Command::Convert(args) => {
            let options = import_options(args.from, &args.import);
            run_convert(
                &args.input,
                &args.output,
                &options,
                args.to,
                args.include_song,
                &songs,
            )
            .map(|report| print_convert(&report))
        }
        Command::Triggers(args) => {
            run_triggers(&args.path, args.variant, args.expand).map(|report| print_triggers(&report))
        }
    };

    let exit_code = match result {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn import_options(variant: Option<gmd_format::GmdVariant>, args: &ImportArgs) -> ImportOptions {
    ImportOptions {
        variant,
        mode: if args.strict {
            InferMode::Strict
        } else {
            InferMode::BestEffort
        },
        import_song: args.import_song,
    }
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
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
