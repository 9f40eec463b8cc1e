//! CLI argument definitions for the `gmd` tool.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use gmd_cli::songs::SongDirs;
use gmd_format::GmdVariant;

#[derive(Parser)]
#[command(
    name = "gmd",
    version,
    about = "Inspect and convert GMD level files",
    long_about = "Inspect and convert level files between container formats.\n\n\
                  Supports .lvl (deflate), .gmd (plain text), .gmd2 (zip archive with song)\n\
                  and .gmd3 (plain text with compressed sequence triggers)."
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

    /// JSON file with `songs-dir` and `resources-dir` entries.
    #[arg(long = "song-config", value_name = "PATH", global = true)]
    pub song_config: Option<PathBuf>,

    /// Directory holding downloaded custom songs [default: songs].
    #[arg(long = "songs-dir", value_name = "DIR", global = true)]
    pub songs_dir: Option<PathBuf>,

    /// Directory holding bundled songs [default: Resources].
    #[arg(long = "resources-dir", value_name = "DIR", global = true)]
    pub resources_dir: Option<PathBuf>,
}

impl Cli {
    /// Song locations from the config file, with command-line flags taking
    /// precedence.
    pub fn song_dirs(&self) -> anyhow::Result<SongDirs> {
        let mut dirs = match &self.song_config {
            Some(path) => SongDirs::load(path)?,
            None => SongDirs::default(),
        };
        if let Some(songs_dir) = &self.songs_dir {
            dirs.songs_dir = songs_dir.clone();
        }
        if let Some(resources_dir) = &self.resources_dir {
            dirs.resources_dir = resources_dir.clone();
        }
        Ok(dirs)
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// List the supported container formats.
    Formats,

    /// Import a level file and print a summary.
    Inspect(InspectArgs),

    /// Convert a level file to another container format.
    Convert(ConvertArgs),

    /// List the sequence triggers in a level file.
    Triggers(TriggersArgs),
}

/// Options shared by commands that import a level.
#[derive(Args)]
pub struct ImportArgs {
    /// Fail on unrecognised extensions instead of assuming .gmd.
    #[arg(long = "strict")]
    pub strict: bool,

    /// Place a .gmd2 archive's song into the song directories.
    #[arg(long = "import-song")]
    pub import_song: bool,
}

#[derive(Parser)]
pub struct InspectArgs {
    /// Level file to inspect.
    #[arg(value_name = "FILE")]
    pub path: PathBuf,

    /// Container format (default: inferred from the extension).
    #[arg(long = "type", value_name = "TYPE", value_parser = parse_variant)]
    pub variant: Option<GmdVariant>,

    #[command(flatten)]
    pub import: ImportArgs,
}

#[derive(Parser)]
pub struct ConvertArgs {
    /// Level file to read.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// File to write.
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Input container format (default: inferred from INPUT).
    #[arg(long = "from", value_name = "TYPE", value_parser = parse_variant)]
    pub from: Option<GmdVariant>,

    /// Output container format (default: inferred from OUTPUT).
    #[arg(long = "to", value_name = "TYPE", value_parser = parse_variant)]
    pub to: Option<GmdVariant>,

    #[command(flatten)]
    pub import: ImportArgs,

    /// Embed the level's song when writing a .gmd2 archive.
    #[arg(long = "include-song")]
    pub include_song: bool,
}

#[derive(Parser)]
pub struct TriggersArgs {
    /// Level file to scan.
    #[arg(value_name = "FILE")]
    pub path: PathBuf,

    /// Container format (default: inferred from the extension).
    #[arg(long = "type", value_name = "TYPE", value_parser = parse_variant)]
    pub variant: Option<GmdVariant>,

    /// Run the run-length expansion pass before listing.
    #[arg(long = "expand")]
    pub expand: bool,
}

fn parse_variant(value: &str) -> Result<GmdVariant, String> {
    value.parse().map_err(|e: gmd_format::GmdError| e.to_string())
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
